use crate::error::{HistoryError, Result};
use crate::source::{JasparFlatSource, RawArchiveSource, SourceCatalog};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Archive era of one release's published data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Combined `>ID NAME` flat file with bracketed count rows
    Jaspar,
    /// Directory with `matrix_list.txt` plus plain per-id count files
    Raw,
}

/// Where and in which format one release lives on disk
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSpec {
    pub label: String,
    pub format: SourceFormat,
    pub path: PathBuf,
}

/// Run configuration, deserialized from TOML and injected at startup.
/// The order of `[[releases]]` entries is the chronological order and
/// the only ordering relation in the system.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    pub releases: Vec<ReleaseSpec>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("report")
}

impl ReportConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    /// * Returns `HistoryError::Io` if the file cannot be read
    /// * Returns `HistoryError::InvalidFileFormat` if it is not valid TOML
    /// * Returns `HistoryError::InvalidParameter` if no releases are
    ///   listed or a release label repeats
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parses configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(text)
            .map_err(|e| HistoryError::InvalidFileFormat(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.releases.is_empty() {
            return Err(HistoryError::invalid_parameter(
                "releases",
                "[]",
                "at least one release is required",
            ));
        }
        let mut seen = HashSet::new();
        for release in &self.releases {
            if !seen.insert(release.label.as_str()) {
                return Err(HistoryError::invalid_parameter(
                    "releases",
                    &release.label,
                    "release labels must be unique",
                ));
            }
        }
        Ok(())
    }

    /// Release labels, oldest first
    pub fn release_labels(&self) -> Vec<String> {
        self.releases.iter().map(|r| r.label.clone()).collect()
    }

    /// Builds the release-to-adapter lookup this configuration describes
    pub fn catalog(&self) -> SourceCatalog {
        let mut catalog = SourceCatalog::new();
        for release in &self.releases {
            match release.format {
                SourceFormat::Jaspar => catalog.insert(
                    release.label.as_str(),
                    Box::new(JasparFlatSource::new(release.path.clone())),
                ),
                SourceFormat::Raw => catalog.insert(
                    release.label.as_str(),
                    Box::new(RawArchiveSource::new(release.path.clone())),
                ),
            }
        }
        catalog
    }
}
