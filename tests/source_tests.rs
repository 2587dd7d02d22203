use motif_history_rs::config::{ReportConfig, SourceFormat};
use motif_history_rs::error::HistoryError;
use motif_history_rs::source::{
    read_flat_collection, JasparFlatSource, ProfileFilter, ProfileSource, RawArchiveSource,
    SourceCatalog,
};
use pretty_assertions::assert_eq;
use std::io::{self, BufReader, Read};

#[test]
fn test_jaspar_flat_file() {
    let source = JasparFlatSource::new("tests/data/pfm_2016.txt");
    let mut matrices = source
        .fetch_collection("2016", &ProfileFilter::default())
        .unwrap();
    matrices.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(matrices.len(), 3);
    assert_eq!(matrices[0].id, "MA0001.2");
    assert_eq!(matrices[0].base_id, "MA0001");
    assert_eq!(matrices[0].version, 2);
    assert_eq!(matrices[0].name, "AGL3");
    assert_eq!(matrices[0].columns(), 10);
    assert_eq!(matrices[1].id, "MA0002.1");
    assert_eq!(matrices[1].columns(), 5);
    assert_eq!(matrices[2].id, "PF0001.1");
}

#[test]
fn test_jaspar_collection_filter() {
    let source = JasparFlatSource::new("tests/data/pfm_2016.txt");
    let filter = ProfileFilter {
        collection: Some("MA".to_string()),
        tax_group: None,
    };
    let matrices = source.fetch_collection("2016", &filter).unwrap();
    assert_eq!(matrices.len(), 2);
    assert!(matrices.iter().all(|m| m.base_id.starts_with("MA")));
}

#[test]
fn test_jaspar_tax_group_filter_matches_nothing() {
    // the combined flat file carries no annotations
    let source = JasparFlatSource::new("tests/data/pfm_2016.txt");
    let filter = ProfileFilter {
        collection: None,
        tax_group: Some("plants".to_string()),
    };
    let matrices = source.fetch_collection("2016", &filter).unwrap();
    assert!(matrices.is_empty());
}

/// Reader that serves its data and then fails instead of reporting EOF
struct FailAfter {
    data: Vec<u8>,
    pos: usize,
}

impl Read for FailAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.data.len() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk read failed"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn test_flat_file_read_error_propagates() {
    let text = ">MA0001.1 AGL3\nA [ 1 2 ]\nC [ 1 2 ]\nG [ 1 2 ]\nT [ 1 2 ]\n";

    // the same bytes read cleanly parse to one matrix
    let ok = read_flat_collection(text.as_bytes(), "2016", &ProfileFilter::default()).unwrap();
    assert_eq!(ok.len(), 1);

    // a reader failing after the first record must not pass for EOF,
    // otherwise the run would continue on a truncated collection
    let reader = BufReader::new(FailAfter {
        data: text.as_bytes().to_vec(),
        pos: 0,
    });
    let result = read_flat_collection(reader, "2016", &ProfileFilter::default());
    assert!(matches!(result, Err(HistoryError::Io(_))));
}

#[test]
fn test_jaspar_missing_file_is_fetch_error() {
    let source = JasparFlatSource::new("tests/data/nonexistent.txt");
    let result = source.fetch_collection("2016", &ProfileFilter::default());
    assert!(matches!(result, Err(HistoryError::ReleaseFetch { .. })));
}

#[test]
fn test_raw_archive() {
    let source = RawArchiveSource::new("tests/data/archive_2004");
    let mut matrices = source
        .fetch_collection("2004", &ProfileFilter::default())
        .unwrap();
    matrices.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(matrices.len(), 2);
    assert_eq!(matrices[0].id, "MA0001");
    assert_eq!(matrices[0].version, 0);
    assert_eq!(matrices[0].name, "AGL3");
    assert_eq!(matrices[0].columns(), 10);
    assert_eq!(matrices[1].name, "RUNX1");
    assert_eq!(matrices[1].columns(), 5);
}

#[test]
fn test_raw_archive_tax_group_filter() {
    let source = RawArchiveSource::new("tests/data/archive_2004");
    let filter = ProfileFilter {
        collection: None,
        tax_group: Some("plants".to_string()),
    };
    let matrices = source.fetch_collection("2004", &filter).unwrap();
    assert_eq!(matrices.len(), 1);
    assert_eq!(matrices[0].id, "MA0001");
}

#[test]
fn test_catalog_dispatch_and_unknown_release() {
    let mut catalog = SourceCatalog::new();
    catalog.insert(
        "2004",
        Box::new(RawArchiveSource::new("tests/data/archive_2004")),
    );
    catalog.insert(
        "2016",
        Box::new(JasparFlatSource::new("tests/data/pfm_2016.txt")),
    );

    let old = catalog
        .fetch_collection("2004", &ProfileFilter::default())
        .unwrap();
    assert_eq!(old.len(), 2);

    let result = catalog.fetch_collection("1998", &ProfileFilter::default());
    assert!(matches!(result, Err(HistoryError::ReleaseFetch { .. })));
}

#[test]
fn test_config_parsing() {
    let config = ReportConfig::from_toml(
        r#"
out_dir = "report"

[[releases]]
label = "2004"
format = "raw"
path = "tests/data/archive_2004"

[[releases]]
label = "2016"
format = "jaspar"
path = "tests/data/pfm_2016.txt"
"#,
    )
    .unwrap();

    assert_eq!(config.release_labels(), vec!["2004", "2016"]);
    assert_eq!(config.releases[0].format, SourceFormat::Raw);
    assert_eq!(config.releases[1].format, SourceFormat::Jaspar);

    let catalog = config.catalog();
    let matrices = catalog
        .fetch_collection("2016", &ProfileFilter::default())
        .unwrap();
    assert_eq!(matrices.len(), 3);
}

#[test]
fn test_config_rejects_duplicate_labels() {
    let result = ReportConfig::from_toml(
        r#"
[[releases]]
label = "2016"
format = "jaspar"
path = "a.txt"

[[releases]]
label = "2016"
format = "jaspar"
path = "b.txt"
"#,
    );
    assert!(matches!(result, Err(HistoryError::InvalidParameter { .. })));
}

#[test]
fn test_config_rejects_empty_releases() {
    let result = ReportConfig::from_toml("releases = []\n");
    assert!(matches!(result, Err(HistoryError::InvalidParameter { .. })));
}
