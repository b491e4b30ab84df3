use clap::{Parser, ValueEnum};
use pricemap::prelude::*;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing::{error, info};

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Quantile,
    MinMax,
}

#[derive(Clone, Copy, ValueEnum)]
enum LegendDetail {
    Compact,
    Detailed,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Data root holding the metadata and feature collection.
    /// Starts with http:// or https:// to fetch over the network.
    #[arg(long, default_value = ".")]
    data: String,

    /// Optional params file in JSON, see the `params` binary.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Write the styled feature collection here instead of STDOUT.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the legend panel as HTML.
    #[arg(long)]
    legend: Option<PathBuf>,

    /// Write legend, status, viewport and layer together as JSON.
    #[arg(long)]
    map: Option<PathBuf>,

    #[arg(long, value_enum)]
    policy: Option<Policy>,

    #[arg(long, requires = "high")]
    low: Option<f64>,

    #[arg(long, requires = "low")]
    high: Option<f64>,

    #[arg(long, value_enum)]
    verbosity: Option<LegendDetail>,
}

fn main() -> ExitCode {
    // Register an event subscriber that prints events to STDERR.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install tracing subscriber");
    }

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "render failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.params {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };

    match (args.policy, args.low.zip(args.high)) {
        (Some(Policy::MinMax), _) => config.policy = ClipPolicy::MinMax,
        (_, Some((low, high))) => config.policy = ClipPolicy::Quantile { low, high },
        (Some(Policy::Quantile), None) => config.policy = ClipPolicy::default(),
        (None, None) => {}
    }

    if let Some(verbosity) = args.verbosity {
        config.verbosity = match verbosity {
            LegendDetail::Compact => Verbosity::Compact,
            LegendDetail::Detailed => Verbosity::Detailed,
        };
    }

    info!(data = %args.data, policy = %config.policy, "rendering");
    let rendered = if args.data.starts_with("http://") || args.data.starts_with("https://") {
        render_remote(&args.data, config)?
    } else {
        Session::new(DirSource::new(&args.data), config).render()?
    };

    if let Some(path) = &args.legend {
        std::fs::write(path, rendered.legend.to_html())?;
        info!(path = %path.display(), "wrote legend");
    }

    if let Some(path) = &args.map {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &rendered)?;
        info!(path = %path.display(), "wrote map description");
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    serde_json::to_writer(&mut writer, &rendered.layer)?;
    writer.flush()?;

    eprintln!("{}", rendered.status);
    Ok(())
}

#[cfg(feature = "http")]
fn render_remote(
    base: &str,
    config: RenderConfig,
) -> Result<RenderedMap, Box<dyn std::error::Error>> {
    Ok(Session::new(HttpSource::new(base), config).render()?)
}

#[cfg(not(feature = "http"))]
fn render_remote(
    base: &str,
    _config: RenderConfig,
) -> Result<RenderedMap, Box<dyn std::error::Error>> {
    Err(format!("cannot fetch {base}: built without the `http` feature").into())
}
