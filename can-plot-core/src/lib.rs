//! CAN Plot Core Library
//!
//! A stateless library that pulls CAN channels out of a logged container and
//! prepares them for plotting on one shared axis.
//!
//! # Architecture
//!
//! - The [`resolver`] maps user tokens (symbolic keys, decimal or hex codes)
//!   to channel keys. Symbolic keys win; unknown tokens are skipped with a
//!   warning.
//! - The [`aggregator`] reads each resolved channel, restores timestamp order,
//!   normalizes unit and scale, and folds all channels into a [`PlotBundle`]
//!   with a combined unit label and the global value range.
//! - [`annotations`] resolves marker rows by their 1-based index.
//!
//! The library does NOT render anything. Renderers consume the bundle, which
//! is plain owned data and serializes with serde.
//!
//! # Example Usage
//!
//! ```no_run
//! use can_plot_core::{AnnotationRequest, Extractor, PlotConfig};
//! use std::path::Path;
//!
//! let extractor = Extractor::new(PlotConfig::new().with_unit_separator("/"));
//! let bundle = extractor
//!     .prepare_file(
//!         Path::new("canlog.h5"),
//!         &["EngineTemp", "0x101"],
//!         &AnnotationRequest::All,
//!     )
//!     .unwrap();
//!
//! for series in &bundle.series {
//!     println!("{} [{}]: {} samples", series.label, series.unit, series.samples.len());
//! }
//! ```

// Public modules
pub mod aggregator;
pub mod annotations;
pub mod config;
pub mod container;
pub mod extractor;
pub mod normalize;
pub mod resolver;
pub mod types;

// Re-export main types for convenience
pub use aggregator::{Extrema, PlotBundle, SeriesAggregator};
pub use annotations::AnnotationRequest;
pub use config::{CodeCollisionPolicy, ContainerLayout, PlotConfig};
pub use container::{validate_log_path, LogContainer, MemoryContainer};
#[cfg(feature = "hdf5")]
pub use container::Hdf5Container;
pub use extractor::Extractor;
pub use resolver::{IdentifierResolver, Resolution};
pub use types::{
    AnnotationEvent, ChannelAttributes, ChannelInfo, ChannelSeries, PlotError, Result, Sample,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
