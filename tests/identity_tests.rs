use motif_history_rs::error::HistoryError;
use motif_history_rs::identity::parse_matrix_id;

#[test]
fn test_versioned_identifier() {
    let (base, version) = parse_matrix_id("MA0001.2").unwrap();
    assert_eq!(base, "MA0001");
    assert_eq!(version, 2);
}

#[test]
fn test_unversioned_identifier() {
    let (base, version) = parse_matrix_id("MA0001").unwrap();
    assert_eq!(base, "MA0001");
    assert_eq!(version, 0);
}

#[test]
fn test_empty_identifier() {
    let result = parse_matrix_id("");
    assert!(matches!(
        result,
        Err(HistoryError::MalformedIdentifier { .. })
    ));
}

#[test]
fn test_empty_base() {
    let result = parse_matrix_id(".5");
    assert!(matches!(
        result,
        Err(HistoryError::MalformedIdentifier { .. })
    ));
}

#[test]
fn test_double_dotted_identifier_rejected() {
    // splits on the first dot, remainder must be an integer
    let result = parse_matrix_id("MA0001.2.1");
    assert!(matches!(
        result,
        Err(HistoryError::MalformedIdentifier { .. })
    ));
}

#[test]
fn test_non_numeric_suffix_rejected() {
    let result = parse_matrix_id("MA0001.x");
    assert!(matches!(
        result,
        Err(HistoryError::MalformedIdentifier { .. })
    ));
}
