//! CAN Plot CLI Application
//!
//! Command-line front end for the can-plot-core library. It validates the
//! log path, resolves the requested CAN IDs, and writes the resulting plot
//! bundle (JSON for a renderer, or a readable summary).

use anyhow::{Context, Result};
use can_plot_core::{validate_log_path, AnnotationRequest, ContainerLayout, Extractor};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// CAN Plot - Extract CAN channels from HDF5 logs for plotting
#[derive(Parser, Debug)]
#[command(name = "can-plot")]
#[command(about = "Plot CAN data from HDF5 files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to HDF5 log
    #[arg(value_name = "LOGFILE", value_parser = parse_log_path)]
    logfile: PathBuf,

    /// CAN IDs to use for plotting (name, decimal code or 0x-prefixed hex code)
    #[arg(value_name = "CAN_ID", required_unless_present = "list")]
    can_ids: Vec<String>,

    /// Plot comments as vertical lines. If no index is given, show all.
    #[arg(short = 'c', long = "plot-comments", value_name = "INDEX", num_args = 0..)]
    plot_comments: Option<Vec<usize>>,

    /// List the channels of the log instead of plotting
    #[arg(long)]
    list: bool,

    /// Path to configuration file (config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Separator between units in the axis label
    #[arg(long, value_name = "TEXT")]
    separator: Option<String>,

    /// Plot raw values, ignoring the channels' scale attribute
    #[arg(long)]
    no_scale: bool,

    /// Channels are stored at the file root with quoted keys
    #[arg(long)]
    top_level: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Plot CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using core library v{}", can_plot_core::VERSION);

    run(&args)
}

/// Build the bundle (or listing) and write it out
fn run(args: &Args) -> Result<()> {
    let config = effective_config(args)?;
    let extractor = Extractor::new(config.plot.clone());
    let output_path = args.output.as_deref().or(config.output.path.as_deref());

    if args.list {
        let channels = extractor
            .inventory_file(&args.logfile)
            .with_context(|| format!("Failed to list channels of {:?}", args.logfile))?;
        let mut out = report::open_output(output_path)?;
        return report::write_inventory(&mut *out, &channels, config.output.format);
    }

    let annotations = AnnotationRequest::from_flag(args.plot_comments.clone());
    let bundle = extractor
        .prepare_file(&args.logfile, &args.can_ids, &annotations)
        .with_context(|| format!("Failed to read {:?}", args.logfile))?;

    if bundle.is_empty() {
        log::warn!("None of the requested CAN IDs were found, nothing to plot");
    }

    // Only touch the output once there is something to write
    let mut out = report::open_output(output_path)?;
    report::write_bundle(&mut *out, &bundle, config.output.format)
}

/// Argument boundary check: the log must be an existing .h5/.hdf5 file
fn parse_log_path(value: &str) -> std::result::Result<PathBuf, String> {
    validate_log_path(Path::new(value)).map_err(|e| e.to_string())
}

/// Merge the configuration file (if any) with command line overrides
fn effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(separator) = &args.separator {
        config.plot.unit_separator = separator.clone();
    }
    if args.no_scale {
        config.plot.apply_scale = false;
    }
    if args.top_level {
        config.plot.layout = ContainerLayout {
            annotation_table: config.plot.layout.annotation_table.clone(),
            ..ContainerLayout::top_level()
        };
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| write_record(buf, record))
        .init();
}

fn write_record<W: Write>(buf: &mut W, record: &log::Record) -> io::Result<()> {
    writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
}
