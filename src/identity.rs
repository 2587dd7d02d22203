use crate::error::{HistoryError, Result};

/// Splits a release-specific matrix identifier into its stable base id
/// and version number.
///
/// Identifiers are either bare (`MA0001`, pre-versioning era) or carry a
/// numeric suffix after a dot (`MA0001.2`). The split happens on the
/// *first* dot only, matching how the archive has always assigned ids.
///
/// # Arguments
/// * `id` - Release-specific matrix identifier
///
/// # Returns
/// * `Result<(String, u32)>` - The base identifier and its version,
///   where version `0` means "no explicit version"
///
/// # Errors
/// * Returns `HistoryError::MalformedIdentifier` if the identifier is
///   empty, has an empty base, or the suffix is not an integer
pub fn parse_matrix_id(id: &str) -> Result<(String, u32)> {
    if id.is_empty() {
        return Err(HistoryError::malformed_identifier(id, "empty identifier"));
    }

    match id.split_once('.') {
        None => Ok((id.to_string(), 0)),
        Some((base, suffix)) => {
            if base.is_empty() {
                return Err(HistoryError::malformed_identifier(
                    id,
                    "empty base identifier",
                ));
            }
            let version = suffix.parse::<u32>().map_err(|_| {
                HistoryError::malformed_identifier(
                    id,
                    format!("version suffix '{}' is not an integer", suffix),
                )
            })?;
            Ok((base.to_string(), version))
        }
    }
}
