use crate::error::{HistoryError, Result};
use crate::identity::parse_matrix_id;
use polars::prelude::*;

/// Represents a Position Frequency Matrix (PFM)
/// Stored as a DataFrame with columns A, C, G, T; height = motif length
pub type Pfm = DataFrame;

/// One profile as published in one release of the archive.
///
/// `base_id` and `version` are derived from `id` at construction time,
/// so an instance always carries a consistent identity triple.
#[derive(Debug, Clone)]
pub struct ProfileMatrix {
    /// Release-specific identifier, possibly with a version suffix
    pub id: String,
    /// Stable identifier shared by all versions of this profile
    pub base_id: String,
    /// Explicit version, `0` for pre-versioning releases
    pub version: u32,
    /// Display name; may legitimately change between releases
    pub name: String,
    /// The count grid
    pub counts: Pfm,
}

impl ProfileMatrix {
    /// Builds a matrix from its raw parts, parsing the identity out of `id`.
    ///
    /// # Errors
    /// * Returns `HistoryError::MalformedIdentifier` if `id` cannot be split
    ///   into a base identifier and version
    pub fn new(id: impl Into<String>, name: impl Into<String>, counts: Pfm) -> Result<Self> {
        let id = id.into();
        let (base_id, version) = parse_matrix_id(&id)?;
        Ok(ProfileMatrix {
            id,
            base_id,
            version,
            name: name.into(),
            counts,
        })
    }

    /// Number of positions in the motif
    pub fn columns(&self) -> usize {
        self.counts.height()
    }
}

/// Builds a count grid from four per-base rows (positions left to right).
///
/// # Errors
/// * Returns `HistoryError::DataError` if the rows have unequal lengths
pub fn pfm_from_rows(a: &[f64], c: &[f64], g: &[f64], t: &[f64]) -> Result<Pfm> {
    if a.len() != c.len() || a.len() != g.len() || a.len() != t.len() {
        return Err(HistoryError::DataError(format!(
            "count rows have unequal lengths: A={} C={} G={} T={}",
            a.len(),
            c.len(),
            g.len(),
            t.len()
        )));
    }

    DataFrame::new(vec![
        Column::new("A".into(), a.to_vec()),
        Column::new("C".into(), c.to_vec()),
        Column::new("G".into(), g.to_vec()),
        Column::new("T".into(), t.to_vec()),
    ])
    .map_err(|e| HistoryError::DataError(e.to_string()))
}
