use crate::error::{HistoryError, Result};
use crate::types::{pfm_from_rows, Pfm, ProfileMatrix};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;
use std::path::PathBuf;
use tracing::{error, warn};

/// Optional restriction of a release's collection.
///
/// `collection` matches on the id prefix (e.g. `MA` for the core
/// collection). `tax_group` matches the annotation tag carried by
/// archive eras that publish annotations; eras without annotations
/// cannot satisfy it.
#[derive(Debug, Default, Clone)]
pub struct ProfileFilter {
    pub collection: Option<String>,
    pub tax_group: Option<String>,
}

impl ProfileFilter {
    fn matches_id(&self, id: &str) -> bool {
        match &self.collection {
            Some(prefix) => id.starts_with(prefix.as_str()),
            None => true,
        }
    }

    fn matches_tax_group(&self, tax_group: Option<&str>) -> bool {
        match &self.tax_group {
            Some(wanted) => tax_group == Some(wanted.as_str()),
            None => true,
        }
    }
}

/// Capability interface over the per-era archive formats: given a
/// release label and a filter, produce that release's matrices.
pub trait ProfileSource {
    /// # Errors
    /// * Returns `HistoryError::ReleaseFetch` if the release's data
    ///   cannot be loaded or parsed
    fn fetch_collection(&self, release: &str, filter: &ProfileFilter)
        -> Result<Vec<ProfileMatrix>>;
}

/// Maps each release label to the adapter that can read it. Built from
/// configuration at startup; fetching an unconfigured release fails.
#[derive(Default)]
pub struct SourceCatalog {
    by_release: HashMap<String, Box<dyn ProfileSource>>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, release: impl Into<String>, source: Box<dyn ProfileSource>) {
        self.by_release.insert(release.into(), source);
    }
}

impl ProfileSource for SourceCatalog {
    fn fetch_collection(
        &self,
        release: &str,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileMatrix>> {
        let source = self
            .by_release
            .get(release)
            .ok_or_else(|| HistoryError::release_fetch(release, "no source configured"))?;
        source.fetch_collection(release, filter)
    }
}

/// Wraps any error other than an already-contextual fetch failure into
/// a `ReleaseFetch` carrying the release label.
fn into_fetch_error(release: &str, e: HistoryError) -> HistoryError {
    match e {
        HistoryError::ReleaseFetch { .. } => e,
        other => HistoryError::release_fetch(release, other.to_string()),
    }
}

/// Keeps a record when its identifier parses; a malformed id aborts
/// that matrix only, with an error log, and the rest of the collection
/// still loads.
fn push_record(
    out: &mut Vec<ProfileMatrix>,
    release: &str,
    id: String,
    name: String,
    counts: Pfm,
) {
    match ProfileMatrix::new(id, name, counts) {
        Ok(matrix) => out.push(matrix),
        Err(e) => error!(release = %release, error = %e, "skipping matrix with malformed identifier"),
    }
}

/// Modern-era adapter: one combined text file per release, records of
/// the form
///
/// ```text
/// >MA0001.2 AGL3
/// A [ 0  3 79 40 ]
/// C [94 75  4  3 ]
/// G [ 1  0  3  4 ]
/// T [ 2 19 11 50 ]
/// ```
pub struct JasparFlatSource {
    path: PathBuf,
}

impl JasparFlatSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JasparFlatSource { path: path.into() }
    }

    fn load(&self, release: &str, filter: &ProfileFilter) -> Result<Vec<ProfileMatrix>> {
        let file = File::open(&self.path)?;
        read_flat_collection(BufReader::new(file), release, filter)
    }
}

/// Parses a combined flat file from any buffered reader.
///
/// # Errors
/// * Returns `HistoryError::Io` if the reader fails mid-file; a short
///   read must not pass for end-of-file, the caller would otherwise
///   build a truncated history
/// * Returns `HistoryError::InvalidFileFormat` if no records are found
///   or a record is structurally broken
pub fn read_flat_collection<R: BufRead>(
    reader: R,
    release: &str,
    filter: &ProfileFilter,
) -> Result<Vec<ProfileMatrix>> {
    if filter.tax_group.is_some() {
        warn!(
            release = %release,
            "combined flat files carry no annotations, tax group filter matches nothing"
        );
        return Ok(Vec::new());
    }

    let mut lines = reader.lines().peekable();
    let mut matrices = Vec::new();
    let mut records = 0usize;

    skip_until_header(&mut lines)?;
    while let Some((id, name, counts)) = parse_flat_record(&mut lines)? {
        records += 1;
        if filter.matches_id(&id) {
            push_record(&mut matrices, release, id, name, counts);
        }
        skip_until_header(&mut lines)?;
    }

    if records == 0 {
        return Err(HistoryError::InvalidFileFormat(format!(
            "no matrix records found in release '{}'",
            release
        )));
    }

    Ok(matrices)
}

impl ProfileSource for JasparFlatSource {
    fn fetch_collection(
        &self,
        release: &str,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileMatrix>> {
        self.load(release, filter)
            .map_err(|e| into_fetch_error(release, e))
    }
}

/// Advances the iterator until a `>` header line is found, propagating
/// any read failure instead of treating it as end-of-file
fn skip_until_header<I>(lines: &mut Peekable<I>) -> Result<()>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    while let Some(peeked) = lines.peek() {
        if matches!(peeked, Ok(line) if line.starts_with('>')) {
            break;
        }
        if let Some(Err(e)) = lines.next() {
            return Err(HistoryError::Io(e));
        }
    }
    Ok(())
}

/// Parses one `>ID NAME` record with its four bracketed count rows
fn parse_flat_record<I>(lines: &mut I) -> Result<Option<(String, String, Pfm)>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = match lines.next() {
        Some(Ok(line)) if line.starts_with('>') => line,
        Some(Ok(_)) | None => return Ok(None),
        Some(Err(e)) => return Err(HistoryError::Io(e)),
    };

    let mut tokens = header[1..].split_whitespace();
    let id = tokens
        .next()
        .ok_or_else(|| HistoryError::InvalidFileFormat("missing matrix id in header".into()))?
        .to_string();
    let name = tokens.collect::<Vec<_>>().join(" ");

    let mut rows: HashMap<char, Vec<f64>> = HashMap::new();
    for _ in 0..4 {
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(HistoryError::Io(e)),
            None => {
                return Err(HistoryError::InvalidFileFormat(format!(
                    "truncated count rows for matrix {}",
                    id
                )))
            }
        };
        let (base, values) = parse_count_row(&line, &id)?;
        rows.insert(base, values);
    }

    let counts = assemble_rows(&rows, &id)?;
    Ok(Some((id, name, counts)))
}

/// Parses `A [ 0 3 79 40 ]` into the base letter and its counts
fn parse_count_row(line: &str, id: &str) -> Result<(char, Vec<f64>)> {
    let mut tokens = line.split_whitespace();
    let base = tokens
        .next()
        .and_then(|t| t.chars().next())
        .filter(|c| "ACGT".contains(*c))
        .ok_or_else(|| {
            HistoryError::InvalidFileFormat(format!("invalid count row for matrix {}: {}", id, line))
        })?;

    let values = tokens
        .filter(|t| *t != "[" && *t != "]")
        .map(|t| t.trim_matches(|c| c == '[' || c == ']'))
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                HistoryError::InvalidFileFormat(format!(
                    "invalid count value '{}' for matrix {}",
                    t, id
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((base, values))
}

fn assemble_rows(rows: &HashMap<char, Vec<f64>>, id: &str) -> Result<Pfm> {
    let row = |base: char| {
        rows.get(&base).ok_or_else(|| {
            HistoryError::InvalidFileFormat(format!("matrix {} is missing the {} row", id, base))
        })
    };
    pfm_from_rows(row('A')?, row('C')?, row('G')?, row('T')?)
}

/// Pre-versioning-era adapter: a directory holding `matrix_list.txt`
/// (id, score, name and `; tag "value" ;` annotations) plus one plain
/// four-row count file per matrix id.
pub struct RawArchiveSource {
    dir: PathBuf,
}

impl RawArchiveSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        RawArchiveSource { dir: dir.into() }
    }

    fn load(&self, release: &str, filter: &ProfileFilter) -> Result<Vec<ProfileMatrix>> {
        let list_path = self.dir.join("matrix_list.txt");
        let file = File::open(&list_path)?;
        let reader = BufReader::new(file);
        let mut matrices = Vec::new();
        let mut records = 0usize;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            records += 1;

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return Err(HistoryError::InvalidFileFormat(format!(
                    "matrix list line has too few fields: {}",
                    line
                )));
            }
            let id = fields[0].trim();
            let name = fields[2].trim();
            let tax_group = annotation_tag(line, "tax_group");

            if !filter.matches_id(id) || !filter.matches_tax_group(tax_group.as_deref()) {
                continue;
            }

            let counts = self.read_counts(id)?;
            push_record(&mut matrices, release, id.to_string(), name.to_string(), counts);
        }

        if records == 0 {
            return Err(HistoryError::InvalidFileFormat(format!(
                "no matrix records found in {}",
                list_path.display()
            )));
        }

        Ok(matrices)
    }

    /// Reads `<dir>/<id>.pfm`: four plain rows of counts in A, C, G, T order
    fn read_counts(&self, id: &str) -> Result<Pfm> {
        let path = self.dir.join(format!("{}.pfm", id));
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let rows: Vec<Vec<f64>> = reader
            .lines()
            .filter(|line| {
                line.as_ref()
                    .map(|l| !l.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|line| {
                let line = line.map_err(HistoryError::Io)?;
                line.split_whitespace()
                    .map(|t| {
                        t.parse::<f64>().map_err(|_| {
                            HistoryError::InvalidFileFormat(format!(
                                "invalid count value '{}' in {}",
                                t,
                                path.display()
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        if rows.len() != 4 {
            return Err(HistoryError::InvalidFileFormat(format!(
                "expected 4 count rows in {}, found {}",
                path.display(),
                rows.len()
            )));
        }

        pfm_from_rows(&rows[0], &rows[1], &rows[2], &rows[3])
    }
}

impl ProfileSource for RawArchiveSource {
    fn fetch_collection(
        &self,
        release: &str,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileMatrix>> {
        self.load(release, filter)
            .map_err(|e| into_fetch_error(release, e))
    }
}

/// Extracts a `tag "value"` annotation from a matrix list line
fn annotation_tag(line: &str, tag: &str) -> Option<String> {
    let start = line.find(tag)? + tag.len();
    let rest = &line[start..];
    let open = rest.find('"')?;
    let rest = &rest[open + 1..];
    let close = rest.find('"')?;
    Some(rest[..close].to_string())
}
