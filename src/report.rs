use crate::error::Result;
use crate::history::HistoryTable;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1em; }\n\
table { border-collapse: collapse; }\n\
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: center; }\n\
th.profile, td.profile { text-align: left; }\n\
td.unchanged { color: #999; }\n\
td.removed { color: #b00; font-style: italic; }\n\
td.missing { color: #b00; }\n";

/// Writes the history table as `index.html` under `out_dir`: one row per
/// base id, one column per release.
///
/// Cell rules: a rendered logo when one exists; the versioned id as text
/// when a logo was due but rendering failed; an "unchanged" marker when
/// the profile appeared without changing; a blank cell when the profile
/// has not been introduced yet (it reappears later); a "removed" marker
/// once it is gone for good.
///
/// # Arguments
/// * `table` - The completed history table
/// * `releases` - Release labels, oldest first
/// * `out_dir` - Report directory (logo paths are relative to it)
///
/// # Returns
/// * `Result<PathBuf>` - Path of the written document
///
/// # Errors
/// * Returns `HistoryError::Io` for file creation or write failures
pub fn write_report(table: &HistoryTable, releases: &[String], out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join("index.html");
    let mut file = File::create(&path)?;

    writeln!(file, "<!DOCTYPE html>")?;
    writeln!(file, "<html><head><meta charset=\"utf-8\"/>")?;
    writeln!(file, "<title>Profile matrix history</title>")?;
    writeln!(file, "<style>\n{}</style></head><body>", STYLE)?;
    writeln!(file, "<h1>Profile matrix history</h1>")?;
    writeln!(file, "<table>")?;

    write!(file, "<tr><th class=\"profile\">Profile</th>")?;
    for release in releases {
        write!(file, "<th>{}</th>", escape(release))?;
    }
    writeln!(file, "</tr>")?;

    for (base_id, history) in table.profiles() {
        write!(
            file,
            "<tr><td class=\"profile\">{} {}</td>",
            escape(base_id),
            escape(&history.last.name)
        )?;
        for release in releases {
            match table.entry(base_id, release) {
                Some(entry) => {
                    if let Some(logo) = &entry.logo {
                        write!(
                            file,
                            "<td class=\"logo\"><img src=\"{}\" alt=\"{}\"/></td>",
                            logo.display(),
                            escape(&entry.matrix_id)
                        )?;
                    } else if entry.display_logo() {
                        // Logo was due but rendering failed
                        write!(file, "<td class=\"missing\">{}</td>", escape(&entry.matrix_id))?;
                    } else {
                        write!(file, "<td class=\"unchanged\">unchanged</td>")?;
                    }
                }
                None => {
                    if table.appears_later(base_id, release, releases) {
                        write!(file, "<td class=\"pending\"></td>")?;
                    } else {
                        write!(file, "<td class=\"removed\">removed</td>")?;
                    }
                }
            }
        }
        writeln!(file, "</tr>")?;
    }

    writeln!(file, "</table></body></html>")?;
    info!(path = %path.display(), profiles = table.len(), "report written");

    Ok(path)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
