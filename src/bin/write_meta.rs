use chrono::Local;
use clap::Parser;
use pricemap::{error::Error, period::Quarter};
use serde::Serialize;
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::{error, info};

/// Writes the `meta.json` that accompanies a freshly built feature collection.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Destination file.
    #[arg(short, long, default_value = "docs/data/meta.json")]
    output: PathBuf,

    /// Number of trailing complete quarters the dataset covers.
    #[arg(short, long, default_value_t = 4)]
    quarters: u32,
}

/// Layout of the written `meta.json`.
#[derive(Serialize)]
struct MetaFile {
    updated_at: String,
    range_from: String,
    range_to: String,
}

fn main() -> ExitCode {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install tracing subscriber");
    }

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "failed to write metadata");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let now = Local::now();
    let (from, to) = Quarter::trailing_window(now.date_naive(), args.quarters);

    let meta = MetaFile {
        updated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        range_from: from.code(),
        range_to: to.code(),
    };

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    fs::write(&args.output, serde_json::to_string_pretty(&meta)?).map_err(|source| Error::Io {
        path: args.output.display().to_string(),
        source,
    })?;

    info!(path = %args.output.display(), %from, %to, "wrote metadata");
    Ok(())
}
