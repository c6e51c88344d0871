use anyhow::Result;
use clap::Parser;
use combine_sheets::config;
use combine_sheets::summary;
use combine_sheets::CombineSheetsError;
use combine_sheets::IngestConfig;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Rows shown in the preview
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "combine-sheets")]
#[command(about = "Combine every worksheet of a numbered series of Excel workbooks into one table", long_about = None)]
struct Cli {
    /// Directory holding the workbooks
    #[arg(long, env = "COMBINE_SHEETS_DIR", default_value = ".")]
    directory: PathBuf,

    /// File name prefix before the three-digit index
    #[arg(long, env = "COMBINE_SHEETS_PREFIX", default_value = config::DEFAULT_PREFIX)]
    prefix: String,

    /// First index (inclusive)
    #[arg(long, default_value_t = config::DEFAULT_START)]
    start: u32,

    /// Last index (inclusive)
    #[arg(long, default_value_t = config::DEFAULT_END)]
    end: u32,

    /// Indices to skip, comma separated
    #[arg(long, env = "COMBINE_SHEETS_EXCLUDE", value_delimiter = ',', default_value = "15")]
    exclude: Vec<u32>,
}

impl From<Cli> for IngestConfig {
    fn from(cli: Cli) -> Self {
        IngestConfig {
            directory: cli.directory,
            prefix: cli.prefix,
            start: cli.start,
            end: cli.end,
            excluded: cli.exclude.into_iter().collect::<BTreeSet<u32>>(),
        }
    }
}

fn main() -> Result<ExitCode> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,combine_sheets=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = IngestConfig::from(Cli::parse());
    let ingest = match combine_sheets::run(&config) {
        Ok(ingest) => ingest,
        Err(CombineSheetsError::CapabilityUnavailable { reason }) => {
            error!("cannot read workbooks: {}", reason);
            return Ok(ExitCode::FAILURE);
        }
        Err(error) => return Err(error.into()),
    };

    for failure in &ingest.report.failures {
        warn!("{}", failure);
    }
    info!(
        "loaded {} sheets from {} files ({} units rows removed)",
        ingest.report.sheets_loaded, ingest.report.files_loaded, ingest.report.units_rows_removed
    );

    let table = &ingest.table;
    println!("{}", summary::info(table));
    println!("{}", summary::preview(table, PREVIEW_ROWS));
    for stats in summary::describe(table)? {
        println!("{}", stats);
    }
    Ok(ExitCode::SUCCESS)
}
