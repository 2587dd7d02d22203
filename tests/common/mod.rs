#![allow(dead_code)]

use motif_history_rs::error::{HistoryError, Result};
use motif_history_rs::logo::LogoRenderer;
use motif_history_rs::source::{ProfileFilter, ProfileSource};
use motif_history_rs::types::{pfm_from_rows, Pfm, ProfileMatrix};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn pfm(a: &[f64], c: &[f64], g: &[f64], t: &[f64]) -> Pfm {
    pfm_from_rows(a, c, g, t).unwrap()
}

/// Two-position grid whose first cell is `seed`, for cheap distinct contents
pub fn small_pfm(seed: f64) -> Pfm {
    pfm(&[seed, 2.0], &[3.0, 4.0], &[5.0, 6.0], &[7.0, 8.0])
}

pub fn matrix(id: &str, name: &str, counts: Pfm) -> ProfileMatrix {
    ProfileMatrix::new(id, name, counts).unwrap()
}

/// In-memory release-to-collection source
pub struct MapSource {
    releases: HashMap<String, Vec<ProfileMatrix>>,
}

impl MapSource {
    pub fn new(entries: Vec<(&str, Vec<ProfileMatrix>)>) -> Self {
        MapSource {
            releases: entries
                .into_iter()
                .map(|(label, matrices)| (label.to_string(), matrices))
                .collect(),
        }
    }
}

impl ProfileSource for MapSource {
    fn fetch_collection(
        &self,
        release: &str,
        _filter: &ProfileFilter,
    ) -> Result<Vec<ProfileMatrix>> {
        self.releases
            .get(release)
            .cloned()
            .ok_or_else(|| HistoryError::release_fetch(release, "release not available"))
    }
}

/// Renderer that records every request instead of producing files
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: Vec<(String, String, u32)>,
}

impl LogoRenderer for RecordingRenderer {
    fn render(
        &mut self,
        matrix: &ProfileMatrix,
        release: &str,
        width: u32,
        _height: u32,
    ) -> Result<PathBuf> {
        self.rendered
            .push((matrix.id.clone(), release.to_string(), width));
        Ok(PathBuf::from(format!(
            "logos/{}_{}.svg",
            matrix.id, release
        )))
    }
}

/// Renderer that always fails
pub struct FailingRenderer;

impl LogoRenderer for FailingRenderer {
    fn render(
        &mut self,
        matrix: &ProfileMatrix,
        release: &str,
        _width: u32,
        _height: u32,
    ) -> Result<PathBuf> {
        Err(HistoryError::render(release, &matrix.id, "no backend"))
    }
}

pub fn labels(releases: &[&str]) -> Vec<String> {
    releases.iter().map(|r| r.to_string()).collect()
}
