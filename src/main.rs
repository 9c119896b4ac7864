use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use dbflow::flow::{self, FlowOptions};
use dbflow_core::config::Config;
use dbflow_core::export::{self, OutputFormat};
use dbflow_core::{AdapterOptions, LogAdapter};
use dbflow_feeds::{FetchWindow, FileSource, RowFilter, StdinSource};

#[derive(Parser)]
#[command(
    name = "dbflow",
    about = "Build a database flow graph (code ⇄ tables) from SQL call logs"
)]
struct Cli {
    /// JSON-lines log export to read. Reads stdin when omitted or `-`.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Config file (default: ~/.config/dbflow/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observation window in seconds.
    #[arg(long)]
    period: Option<u64>,

    /// Maximum number of log rows to read.
    #[arg(long)]
    limit: Option<usize>,

    /// End of the observation window (RFC 3339). Defaults to now.
    #[arg(long)]
    until: Option<DateTime<Utc>>,

    /// Directory the graph files are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output format; repeat for several.
    #[arg(long = "format", value_enum)]
    formats: Vec<OutputFormat>,

    /// Print the rendered graph to stdout instead of writing files.
    #[arg(long)]
    stdout: bool,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to built-in config");
            Config::defaults()
        }),
    };
    apply_overrides(&mut config, &cli);

    let period = config.period()?;
    let window = FetchWindow {
        period,
        limit: config.window.limit,
        until: cli.until.unwrap_or_else(Utc::now),
    };
    let options = FlowOptions {
        window,
        filter: RowFilter::new(config.required_field()),
        adapter: LogAdapter::new(AdapterOptions::from(&config.adapter)),
    };

    let graph = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            flow::get_flow(&mut FileSource::new(path), &options).await?
        }
        _ => flow::get_flow(&mut StdinSource::new(), &options).await?,
    };
    tracing::info!(edges = graph.len(), "graph built");

    if cli.stdout {
        let mut out = std::io::stdout().lock();
        for &format in &config.output.formats {
            out.write_all(export::render(&graph, format)?.as_bytes())?;
        }
    } else {
        let written = flow::write_outputs(
            &graph,
            &config.output.dir,
            &config.output.basename,
            &config.output.formats,
        )?;
        for path in written {
            tracing::info!(path = %path.display(), "written");
        }
    }

    tracing::info!("Done");
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(period) = cli.period {
        config.window.period_secs = period;
    }
    if let Some(limit) = cli.limit {
        config.window.limit = limit;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if !cli.formats.is_empty() {
        config.output.formats = cli.formats.clone();
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}
