//! Series aggregation
//!
//! Turns resolved channel keys into sorted, normalized series and folds them
//! into a [`PlotBundle`]: one shared y axis with a combined unit label and the
//! global value range.

use crate::config::PlotConfig;
use crate::container::LogContainer;
use crate::normalize::sort_samples;
use crate::types::{AnnotationEvent, ChannelMetadata, ChannelSeries, Result, Sample};
use serde::Serialize;
use std::sync::Arc;

/// Relative headroom for the top of annotation markers
pub const MARKER_HEADROOM: f64 = 0.02;

/// Relative headroom for annotation labels
pub const LABEL_HEADROOM: f64 = 0.025;

/// Value range across one or more series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    /// Range of a set of values; `None` if there are no comparable values
    pub fn of_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .map(|v| Extrema { min: v, max: v })
            .reduce(Extrema::merge)
    }

    /// Range covering both inputs
    pub fn merge(self, other: Extrema) -> Extrema {
        Extrema {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Combined range of several series
    pub fn across<'a, I>(series: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ChannelSeries>,
    {
        series
            .into_iter()
            .filter_map(|s| Extrema::of_values(s.values()))
            .reduce(Extrema::merge)
    }

    /// `max` raised by a fraction of its magnitude
    pub fn upper_bound(&self, margin: f64) -> f64 {
        self.max + self.max.abs() * margin
    }
}

/// Join units with a separator, in order, keeping repeats
pub fn combined_unit_label<'a, I>(units: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    units.into_iter().collect::<Vec<_>>().join(separator)
}

/// Everything a renderer needs for one plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotBundle {
    /// Series in resolution order
    pub series: Vec<ChannelSeries>,
    /// Combined y axis label
    pub unit_label: String,
    /// Value range across all series; `None` without samples
    pub extrema: Option<Extrema>,
    /// Annotation markers
    pub annotations: Vec<AnnotationEvent>,
    /// Tokens that did not match any channel
    pub unresolved: Vec<String>,
    /// Whether sample values were multiplied by the channel scale
    pub scale_applied: bool,
    /// Relative y axis headroom
    pub headroom: f64,
}

impl PlotBundle {
    /// Y axis limits including headroom
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.extrema.map(|e| (e.min, e.upper_bound(self.headroom)))
    }

    /// Vertical extent of annotation markers
    pub fn marker_span(&self) -> Option<(f64, f64)> {
        self.extrema.map(|e| (e.min, e.upper_bound(MARKER_HEADROOM)))
    }

    /// Height at which annotation labels are drawn
    pub fn label_height(&self) -> Option<f64> {
        self.extrema.map(|e| e.upper_bound(LABEL_HEADROOM))
    }

    /// True if the bundle has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Builds normalized series and bundles
pub struct SeriesAggregator<'a> {
    config: &'a PlotConfig,
}

impl<'a> SeriesAggregator<'a> {
    pub fn new(config: &'a PlotConfig) -> Self {
        Self { config }
    }

    /// Read one channel and normalize it
    ///
    /// Samples are sorted by timestamp and, if configured, scaled.
    pub fn load_series<C>(&self, container: &C, key: &str) -> Result<ChannelSeries>
    where
        C: LogContainer + ?Sized,
    {
        let metadata = ChannelMetadata::from_attributes(&container.read_attributes(key)?);
        let mut samples = container.read_samples(key)?;
        sort_samples(&mut samples);

        if self.config.apply_scale && metadata.scale != 1.0 {
            apply_scale(&mut samples, metadata.scale);
        }

        log::debug!(
            "Loaded {} ({} samples, unit {}, scale {})",
            key,
            samples.len(),
            metadata.unit,
            metadata.scale
        );

        Ok(ChannelSeries {
            key: key.to_string(),
            label: container.layout().label_for_key(key).to_string(),
            code: metadata.code,
            unit: metadata.unit,
            scale: metadata.scale,
            samples: Arc::from(samples),
        })
    }

    /// Fold series into a bundle
    pub fn bundle(
        &self,
        series: Vec<ChannelSeries>,
        annotations: Vec<AnnotationEvent>,
        unresolved: Vec<String>,
    ) -> PlotBundle {
        let unit_label = combined_unit_label(
            series.iter().map(|s| s.unit.as_str()),
            &self.config.unit_separator,
        );
        let extrema = Extrema::across(&series);

        PlotBundle {
            series,
            unit_label,
            extrema,
            annotations,
            unresolved,
            scale_applied: self.config.apply_scale,
            headroom: self.config.headroom,
        }
    }
}

fn apply_scale(samples: &mut [Sample], scale: f64) {
    for sample in samples.iter_mut() {
        sample.value *= scale;
    }
}
