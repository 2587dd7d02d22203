use crate::error::{HistoryError, Result};
use crate::types::ProfileMatrix;
use ndarray::Array2;
use phf::phf_map;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const PSEUDOCOUNT: f64 = 0.0001;
const BASES: [&str; 4] = ["A", "C", "G", "T"];

static BASE_COLORS: phf::Map<char, &'static str> = phf_map! {
    'A' => "#109648",
    'C' => "#255c99",
    'G' => "#f7b32b",
    'T' => "#d62839",
};

/// Width policy for rendered logos: a fixed pixel width, or a width
/// proportional to the number of motif positions.
#[derive(Debug, Clone, Copy)]
pub enum LogoPolicy {
    Fixed { width: u32 },
    PerColumn { px: u32 },
}

impl LogoPolicy {
    /// Fixed logo height in pixels
    pub const HEIGHT: u32 = 120;

    pub fn width(&self, columns: usize) -> u32 {
        match *self {
            LogoPolicy::Fixed { width } => width,
            LogoPolicy::PerColumn { px } => px * columns as u32,
        }
    }
}

impl Default for LogoPolicy {
    fn default() -> Self {
        LogoPolicy::PerColumn { px: 20 }
    }
}

/// Sink for logo artifacts, invoked by the history builder for every
/// new or changed profile.
pub trait LogoRenderer {
    /// Produces an image for the matrix and returns a reference to it,
    /// relative to the report directory.
    ///
    /// # Errors
    /// * Returns `HistoryError::Render` if the artifact cannot be produced
    fn render(
        &mut self,
        matrix: &ProfileMatrix,
        release: &str,
        width: u32,
        height: u32,
    ) -> Result<PathBuf>;
}

/// Renders sequence logos as standalone SVG files under
/// `<report dir>/logos/`.
///
/// Per-position base frequencies (with a pseudocount against empty
/// columns) are scaled by the position's information content, so
/// conserved positions show tall letters and uninformative ones stay
/// near the baseline.
pub struct SvgLogoRenderer {
    report_dir: PathBuf,
}

impl SvgLogoRenderer {
    /// Creates the renderer and its `logos/` output directory.
    ///
    /// # Errors
    /// * Returns `HistoryError::Io` if the directory cannot be created
    pub fn new(report_dir: impl Into<PathBuf>) -> Result<Self> {
        let report_dir = report_dir.into();
        fs::create_dir_all(report_dir.join("logos"))?;
        Ok(SvgLogoRenderer { report_dir })
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}

impl LogoRenderer for SvgLogoRenderer {
    fn render(
        &mut self,
        matrix: &ProfileMatrix,
        release: &str,
        width: u32,
        height: u32,
    ) -> Result<PathBuf> {
        let svg = logo_svg(matrix, width, height)
            .map_err(|e| HistoryError::render(release, &matrix.id, e.to_string()))?;

        let filename = format!("{}_{}.svg", matrix.id, release);
        let relative = PathBuf::from("logos").join(&filename);
        fs::write(self.report_dir.join(&relative), svg)
            .map_err(|e| HistoryError::render(release, &matrix.id, e.to_string()))?;

        Ok(relative)
    }
}

/// Copies the count grid into a positions x 4 array (A, C, G, T order)
fn count_grid(matrix: &ProfileMatrix) -> Result<Array2<f64>> {
    let positions = matrix.counts.height();
    let mut grid = Array2::<f64>::zeros((positions, 4));

    for (j, base) in BASES.iter().enumerate() {
        let column = matrix
            .counts
            .column(base)
            .map_err(|e| HistoryError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| HistoryError::DataError(e.to_string()))?;
        for i in 0..positions {
            grid[[i, j]] = column.get(i).unwrap_or(0.0);
        }
    }

    Ok(grid)
}

/// Assembles the SVG markup for one matrix
fn logo_svg(matrix: &ProfileMatrix, width: u32, height: u32) -> Result<String> {
    let grid = count_grid(matrix)?;
    let positions = grid.nrows();
    if positions == 0 {
        return Err(HistoryError::DataError(format!(
            "matrix {} has no positions",
            matrix.id
        )));
    }

    let col_width = width as f64 / positions as f64;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r##"<rect width="{width}" height="{height}" fill="#ffffff"/>"##
    );

    for (i, row) in grid.rows().into_iter().enumerate() {
        let total: f64 = row.iter().sum::<f64>() + 4.0 * PSEUDOCOUNT;
        let freqs: Vec<f64> = row.iter().map(|c| (c + PSEUDOCOUNT) / total).collect();

        // Information content in bits, 0..=2 for a 4-letter alphabet
        let entropy: f64 = freqs.iter().map(|p| -p * p.log2()).sum();
        let ic = (2.0 - entropy).max(0.0);

        let mut letters: Vec<(&str, f64)> = BASES
            .iter()
            .zip(&freqs)
            .map(|(base, p)| (*base, p * ic / 2.0 * height as f64))
            .collect();
        // Tallest letter on top of the stack
        letters.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let x = i as f64 * col_width;
        let mut y = height as f64 - letters.iter().map(|(_, h)| h).sum::<f64>();
        for (base, letter_height) in letters {
            if letter_height < 0.5 {
                continue;
            }
            let color = base
                .chars()
                .next()
                .and_then(|b| BASE_COLORS.get(&b))
                .copied()
                .unwrap_or("#000000");
            // Unit glyph: monospace capital at font-size 100 is roughly
            // 60 wide with a 72 cap height above the baseline.
            let sx = col_width / 60.0;
            let sy = letter_height / 72.0;
            let _ = writeln!(
                svg,
                r#"<text transform="translate({x:.2},{:.2}) scale({sx:.4},{sy:.4})" font-family="monospace" font-weight="bold" font-size="100" fill="{color}">{base}</text>"#,
                y + letter_height
            );
            y += letter_height;
        }
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}
