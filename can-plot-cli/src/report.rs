//! Output of plot bundles and channel listings
//!
//! JSON output is the hand-off to a renderer. The summary format is meant
//! for people looking at a log from the terminal.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use can_plot_core::{ChannelInfo, PlotBundle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open the output file, or stdout when no path is given
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Write a plot bundle in the requested format
pub fn write_bundle<W: Write + ?Sized>(
    out: &mut W,
    bundle: &PlotBundle,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, bundle)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => write_bundle_summary(out, bundle)?,
    }
    out.flush()?;
    Ok(())
}

fn write_bundle_summary<W: Write + ?Sized>(out: &mut W, bundle: &PlotBundle) -> io::Result<()> {
    writeln!(out, "Unit label: {}", bundle.unit_label)?;

    match (bundle.extrema, bundle.y_range()) {
        (Some(extrema), Some((low, high))) => writeln!(
            out,
            "Range:      {} .. {} (axis {} .. {})",
            extrema.min, extrema.max, low, high
        )?,
        _ => writeln!(out, "Range:      no samples")?,
    }
    writeln!(
        out,
        "Scale:      {}",
        if bundle.scale_applied { "applied" } else { "raw values" }
    )?;

    writeln!(out, "\nSeries ({}):", bundle.series.len())?;
    for series in &bundle.series {
        let code = series
            .code
            .map(|code| format!("0x{:X}", code))
            .unwrap_or_else(|| "-".to_string());
        let span = match (series.samples.first(), series.samples.last()) {
            (Some(first), Some(last)) => format!("t = {} .. {}", first.ts, last.ts),
            _ => "empty".to_string(),
        };
        writeln!(
            out,
            "  {:<24} {:>10} [{}] {} samples, {}",
            series.label,
            code,
            series.unit,
            series.samples.len(),
            span
        )?;
    }

    if !bundle.annotations.is_empty() {
        writeln!(out, "\nAnnotations ({}):", bundle.annotations.len())?;
        for event in &bundle.annotations {
            writeln!(out, "  {:>12}  {}", event.position, event.label)?;
        }
    }

    if !bundle.unresolved.is_empty() {
        writeln!(out, "\nNot found: {}", bundle.unresolved.join(", "))?;
    }

    Ok(())
}

/// Write a channel listing in the requested format
pub fn write_inventory<W: Write + ?Sized>(
    out: &mut W,
    channels: &[ChannelInfo],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, channels)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => {
            writeln!(out, "Channels ({}):", channels.len())?;
            for channel in channels {
                writeln!(out, "  {}", channel)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}
