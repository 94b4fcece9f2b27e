//! Core types for the CAN plot library
//!
//! This module defines the values that flow from a log container through
//! resolution and aggregation into a plot bundle. Everything here is owned
//! data, so a bundle stays valid after the container has been closed.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, PlotError>;

/// A single `(timestamp, value)` pair of a channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Timestamp as stored in the container
    pub ts: f64,
    /// Measured value (raw or scaled, see [`PlotBundle::scale_applied`])
    pub value: f64,
}

impl Sample {
    pub fn new(ts: f64, value: f64) -> Self {
        Self { ts, value }
    }
}

/// Raw channel attributes as read from the container, before normalization
///
/// Sentinel values (`"None"` strings, missing attributes) are kept as-is here;
/// [`ChannelMetadata::from_attributes`] turns them into defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelAttributes {
    /// Numeric bus code (`hex_id` attribute)
    pub code: Option<u32>,
    /// Display unit, possibly the `"None"` sentinel
    pub unit: Option<String>,
    /// Scale factor, possibly stored as text
    pub scale: Option<RawScale>,
    /// Free text description, possibly the `"None"` sentinel
    pub description: Option<String>,
}

impl ChannelAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the numeric code
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    /// Builder method: set the unit attribute
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder method: set a numeric scale attribute
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(RawScale::Number(scale));
        self
    }

    /// Builder method: set a textual scale attribute (e.g. `"None"`)
    pub fn with_scale_text(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(RawScale::Text(scale.into()));
        self
    }

    /// Builder method: set the description attribute
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A scale attribute as stored: either a number or a string
#[derive(Debug, Clone, PartialEq)]
pub enum RawScale {
    Number(f64),
    Text(String),
}

/// Normalized channel metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelMetadata {
    pub code: Option<u32>,
    pub unit: String,
    pub scale: f64,
    pub description: Option<String>,
}

impl ChannelMetadata {
    /// Apply the sentinel rules to raw attributes
    pub fn from_attributes(attributes: &ChannelAttributes) -> Self {
        Self {
            code: attributes.code,
            unit: crate::normalize::normalize_unit(attributes.unit.as_deref()),
            scale: crate::normalize::normalize_scale(attributes.scale.as_ref()),
            description: crate::normalize::normalize_description(
                attributes.description.as_deref(),
            ),
        }
    }
}

/// One channel ready for plotting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSeries {
    /// Key of the channel inside the container
    pub key: String,
    /// Legend label (key without surrounding quotes)
    pub label: String,
    /// Numeric bus code, if the channel carries one
    pub code: Option<u32>,
    /// Normalized display unit
    pub unit: String,
    /// Normalized scale factor
    pub scale: f64,
    /// Samples sorted by timestamp; shared between entries of the same channel
    pub samples: Arc<[Sample]>,
}

impl ChannelSeries {
    /// Iterate over the sample values
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    /// True if both series point at the same sample storage
    pub fn shares_samples_with(&self, other: &ChannelSeries) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

/// One row of the container's annotation table
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    /// 1-based index as stored in the table
    pub index: u32,
    /// Position on the time axis
    pub position: f64,
    /// Undecoded label bytes
    pub label: Vec<u8>,
}

/// A resolved annotation marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationEvent {
    pub position: f64,
    pub label: String,
}

/// Summary of a channel for inventory listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub metadata: ChannelMetadata,
    pub sample_count: usize,
}

impl fmt::Display for ChannelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self.metadata.code {
            Some(code) => format!("0x{:X}", code),
            None => "-".to_string(),
        };
        write!(
            f,
            "{} = {} [{}, x{}] {} samples",
            self.label, code, self.metadata.unit, self.metadata.scale, self.sample_count
        )?;
        if let Some(description) = &self.metadata.description {
            write!(f, " ({})", description)?;
        }
        Ok(())
    }
}

/// Errors that can occur while reading and preparing channels
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("{0:?} is not an HDF5 file!")]
    InvalidLogFile(PathBuf),

    #[error("Channel not found in container: {0}")]
    ChannelNotFound(String),

    #[error("Missing {what} in container: {location}")]
    MissingEntry { what: &'static str, location: String },

    #[error("Annotation index {index} out of range (table has {available} rows)")]
    AnnotationIndexOutOfRange { index: usize, available: usize },

    #[error("Annotation {index} has a label that is not valid UTF-8")]
    InvalidAnnotationLabel {
        index: usize,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Numeric code 0x{code:X} is used by both {first} and {second}")]
    DuplicateCode {
        code: u32,
        first: String,
        second: String,
    },

    #[error("Container backend not available: {0}")]
    BackendUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5Error(#[from] hdf5::Error),
}
