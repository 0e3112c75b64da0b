use std::path::PathBuf;

use clap::Parser;
use glycoplot::Settings;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use pmf_store::Store;

/// Load a directory of raw PMF files into the PMF database
///
/// Each file is stored under its file stem, like `aDGal13bDGalf` for `aDGal13bDGalf.pmf`. Files that were already
/// ingested are left untouched.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The directory of PMF files to ingest [default: from the settings]
    directory: Option<PathBuf>,

    /// The settings file to read, if it exists
    #[arg(long, default_value = Settings::FILE_NAME)]
    settings: PathBuf,

    /// Use this PMF database instead of the one in the settings
    #[arg(long)]
    database: Option<PathBuf>,

    /// Only ingest files with this extension [default: from the settings]
    #[arg(long)]
    extension: Option<String>,
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = Settings::load_or_default(&args.settings)?;
    let database = args.database.unwrap_or(settings.database);
    let directory = args.directory.unwrap_or(settings.pmf_directory);
    let extension = args.extension.unwrap_or(settings.pmf_extension);

    let store = Store::open(&database)?;
    let report = store.ingest_directory(&directory, &extension)?;

    for (id, error) in report.failed {
        println!("Skipped {id}:");
        render_error(error);
    }
    println!(
        "Ingested {} new PMFs from {directory:?} into {database:?} ({} were already present)",
        report.inserted.len(),
        report.already_present.len()
    );
    Ok(())
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    let diagnostic = diagnostic.into();
    if GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.as_ref())
        .is_err()
    {
        buf = diagnostic.to_string();
    }
    println!("{buf}");
}
