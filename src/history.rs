use crate::compare::same_content;
use crate::error::Result;
use crate::logo::{LogoPolicy, LogoRenderer};
use crate::source::{ProfileFilter, ProfileSource};
use crate::types::ProfileMatrix;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{info, warn};

/// One cell of the report: a profile's state in a single release.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub matrix_id: String,
    pub base_id: String,
    pub version: u32,
    pub name: String,
    /// First appearance of this base id across all releases so far
    pub is_new: bool,
    /// Content changed relative to the previous appearance
    pub differs: bool,
    /// Reference to the rendered logo artifact, when one was produced
    pub logo: Option<PathBuf>,
}

impl HistoryEntry {
    /// A logo is materialized exactly when the profile is new or changed
    pub fn display_logo(&self) -> bool {
        self.is_new || self.differs
    }
}

/// Per-base-id history: one entry per release the profile appeared in,
/// plus the most recently seen matrix (the comparison baseline, kept
/// afterwards so the report can show the current display name).
#[derive(Debug)]
pub struct ProfileHistory {
    pub entries: HashMap<String, HistoryEntry>,
    pub last: ProfileMatrix,
}

/// The completed table: base id → per-release history, row order sorted
/// by base id.
#[derive(Debug, Default)]
pub struct HistoryTable {
    profiles: BTreeMap<String, ProfileHistory>,
}

impl HistoryTable {
    /// Iterates rows in ascending base id order
    pub fn profiles(&self) -> impl Iterator<Item = (&String, &ProfileHistory)> {
        self.profiles.iter()
    }

    pub fn get(&self, base_id: &str) -> Option<&ProfileHistory> {
        self.profiles.get(base_id)
    }

    /// Looks up the entry for one `(base_id, release)` cell
    pub fn entry(&self, base_id: &str, release: &str) -> Option<&HistoryEntry> {
        self.profiles
            .get(base_id)
            .and_then(|history| history.entries.get(release))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Reports whether `base_id` appears in any release strictly after
    /// `release` in the given chronological sequence.
    ///
    /// Used for absent cells to tell "not yet introduced" (reappears
    /// later) apart from "removed" (gone for good). For the last release
    /// in the sequence this degenerates to whether the cell itself has
    /// an entry.
    pub fn appears_later(&self, base_id: &str, release: &str, releases: &[String]) -> bool {
        let Some(pos) = releases.iter().position(|r| r == release) else {
            return false;
        };
        if pos + 1 == releases.len() {
            return self.entry(base_id, release).is_some();
        }
        releases[pos + 1..]
            .iter()
            .any(|later| self.entry(base_id, later).is_some())
    }
}

/// Builds the full version history in a single pass over the releases.
///
/// Releases are processed strictly in the given chronological order and
/// matrices within a release in ascending id order, so the output is
/// fully determined by the inputs. For every matrix the per-base-id
/// baseline decides the classification: no baseline means a new profile,
/// otherwise the equality oracle decides whether content changed. The
/// baseline is updated to the current matrix either way.
///
/// # Arguments
/// * `releases` - Release labels, oldest first
/// * `source` - Collection fetcher (usually a `SourceCatalog`)
/// * `filter` - Collection/taxonomic-group filter applied at fetch time
/// * `renderer` - Logo sink invoked for new or changed profiles
/// * `policy` - Logo width policy
///
/// # Errors
/// * Returns `HistoryError::ReleaseFetch` if any release's collection
///   cannot be loaded; the whole run aborts, a partial history would be
///   misleading in a comparative report
///
/// Render failures do not abort the run: the entry is recorded without
/// a logo reference and a warning is logged.
pub fn build_history(
    releases: &[String],
    source: &dyn ProfileSource,
    filter: &ProfileFilter,
    renderer: &mut dyn LogoRenderer,
    policy: LogoPolicy,
) -> Result<HistoryTable> {
    let mut table = HistoryTable::default();

    for release in releases {
        let mut collection = source.fetch_collection(release, filter)?;
        collection.sort_by(|x, y| x.id.cmp(&y.id));
        info!(
            release = %release,
            matrices = collection.len(),
            "processing release"
        );

        for matrix in collection {
            let (is_new, differs) = match table.profiles.get(&matrix.base_id) {
                None => (true, false),
                Some(history) => {
                    if same_content(&matrix, &history.last) {
                        (false, false)
                    } else {
                        (false, true)
                    }
                }
            };

            let logo = if is_new || differs {
                let width = policy.width(matrix.columns());
                match renderer.render(&matrix, release, width, LogoPolicy::HEIGHT) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(
                            matrix_id = %matrix.id,
                            release = %release,
                            error = %e,
                            "logo render failed, recording entry without artifact"
                        );
                        None
                    }
                }
            } else {
                None
            };

            let entry = HistoryEntry {
                matrix_id: matrix.id.clone(),
                base_id: matrix.base_id.clone(),
                version: matrix.version,
                name: matrix.name.clone(),
                is_new,
                differs,
                logo,
            };

            match table.profiles.entry(matrix.base_id.clone()) {
                Entry::Vacant(slot) => {
                    let mut entries = HashMap::new();
                    entries.insert(release.clone(), entry);
                    slot.insert(ProfileHistory {
                        entries,
                        last: matrix,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let history = slot.get_mut();
                    if history.entries.insert(release.clone(), entry).is_some() {
                        warn!(
                            base_id = %matrix.base_id,
                            release = %release,
                            "duplicate base id within release, keeping later occurrence"
                        );
                    }
                    history.last = matrix;
                }
            }
        }
    }

    Ok(table)
}
