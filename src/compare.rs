use crate::types::ProfileMatrix;

/// Decides whether two matrices for the same base identifier carry
/// equivalent content.
///
/// When both sides come from versioned releases, the version numbers are
/// authoritative: a version bump always and only happens on a content
/// change, so the grids themselves are not compared. If either side is
/// from the pre-versioning era (`version == 0`), the comparison falls
/// back to exact structural equality of the count grids: equal
/// dimensions and equal values at every cell, in order.
///
/// # Arguments
/// * `a` - Current matrix
/// * `b` - The last matrix previously seen for the same base id
///
/// # Returns
/// * `bool` - True if the two matrices represent the same content
pub fn same_content(a: &ProfileMatrix, b: &ProfileMatrix) -> bool {
    // Callers only compare within one base id; differing ids never match.
    if a.base_id != b.base_id {
        return false;
    }

    if a.version > 0 && b.version > 0 {
        return a.version == b.version;
    }

    a.counts.equals(&b.counts)
}
