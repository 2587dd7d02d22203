use clap::Parser;
use motif_history_rs::config::ReportConfig;
use motif_history_rs::error::HistoryError;
use motif_history_rs::history::build_history;
use motif_history_rs::logo::{LogoPolicy, SvgLogoRenderer};
use motif_history_rs::report::write_report;
use motif_history_rs::source::ProfileFilter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

#[derive(Parser)]
#[command(
    name = "history-report",
    about = "Compares transcription factor binding profiles across database releases and renders an HTML history report",
    long_about = "A tool for tracking how binding-profile matrices evolve across successive \
                  releases of a motif database. It determines when each profile first appeared \
                  and when its content changed, renders a sequence logo for every new or changed \
                  occurrence, and emits an HTML table with one row per profile and one column \
                  per release.",
    version,
    after_help = "Example usage:\n    \
                  history-report releases.toml --collection MA\n    \
                  history-report releases.toml --out-dir report --logo-width 160",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// Path to the TOML configuration listing releases oldest-first,
    /// each with a format era and data path
    #[arg(value_name = "CONFIG_FILE")]
    config_file: PathBuf,

    /// Output directory for the report and its logo images
    /// (overrides the config file's out_dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Only include matrices whose id starts with this collection prefix
    #[arg(long)]
    collection: Option<String>,

    /// Only include matrices annotated with this taxonomic group
    /// (applies where the release format carries annotations)
    #[arg(long)]
    tax_group: Option<String>,

    /// Render every logo at this fixed pixel width instead of
    /// proportionally to the motif length
    #[arg(long)]
    logo_width: Option<u32>,

    /// Pixels per motif position for proportional logo widths
    #[arg(long, default_value = "20")]
    per_column: u32,
}

fn run(args: Args) -> Result<(), ReportError> {
    let config = ReportConfig::from_path(&args.config_file)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.out_dir.clone());

    let filter = ProfileFilter {
        collection: args.collection,
        tax_group: args.tax_group,
    };
    let policy = match args.logo_width {
        Some(width) => LogoPolicy::Fixed { width },
        None => LogoPolicy::PerColumn {
            px: args.per_column,
        },
    };

    let releases = config.release_labels();
    let catalog = config.catalog();
    let mut renderer = SvgLogoRenderer::new(&out_dir)?;
    info!(
        releases = releases.len(),
        out_dir = %out_dir.display(),
        "building profile history"
    );

    let table = build_history(&releases, &catalog, &filter, &mut renderer, policy)?;
    let report = write_report(&table, &releases, &out_dir)?;

    println!(
        "{} profiles across {} releases -> {}",
        table.len(),
        releases.len(),
        report.display()
    );

    Ok(())
}

fn main() -> Result<(), ReportError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let start_time = std::time::Instant::now();
    let args = Args::parse();
    run(args)?;

    let elapsed = start_time.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "run complete");

    Ok(())
}
