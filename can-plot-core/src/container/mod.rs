//! Log container access
//!
//! A container holds one entry per channel (samples plus attributes) and an
//! optional annotation table. The [`LogContainer`] trait is the read-only view
//! the resolver and aggregator work against; backends implement it for a
//! concrete storage format.

use crate::config::ContainerLayout;
use crate::types::{AnnotationRow, ChannelAttributes, PlotError, Result, Sample};
use std::path::{Path, PathBuf};

#[cfg(feature = "hdf5")]
pub mod h5;
pub mod memory;

#[cfg(feature = "hdf5")]
pub use h5::Hdf5Container;
pub use memory::MemoryContainer;

/// File suffixes accepted as log containers (compared case-insensitively)
pub const LOG_FILE_SUFFIXES: &[&str] = &["h5", "hdf5"];

/// Read-only view of a log container
pub trait LogContainer {
    /// Layout the container was opened with
    fn layout(&self) -> &ContainerLayout;

    /// Keys of all channels, in container order
    fn channel_keys(&self) -> Result<Vec<String>>;

    /// Raw attributes of a channel
    fn read_attributes(&self, key: &str) -> Result<ChannelAttributes>;

    /// Samples of a channel in stored order (not necessarily sorted)
    fn read_samples(&self, key: &str) -> Result<Vec<Sample>>;

    /// All rows of the annotation table; empty if the table is absent
    fn annotation_rows(&self) -> Result<Vec<AnnotationRow>>;
}

/// Check that `path` names an existing file with an HDF5 suffix
pub fn validate_log_path(path: &Path) -> Result<PathBuf> {
    let has_suffix = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .is_some_and(|ext| LOG_FILE_SUFFIXES.contains(&ext.as_str()));

    if path.is_file() && has_suffix {
        Ok(path.to_path_buf())
    } else {
        Err(PlotError::InvalidLogFile(path.to_path_buf()))
    }
}

/// Open a log file, run `f` against it and close it again
///
/// The file handle is released when this function returns, whether `f`
/// succeeded or not. Anything `f` returns must therefore own its data.
#[cfg(feature = "hdf5")]
pub fn with_log_file<T, F>(path: &Path, layout: &ContainerLayout, f: F) -> Result<T>
where
    F: FnOnce(&dyn LogContainer) -> Result<T>,
{
    let container = Hdf5Container::open(path, layout.clone())?;
    let result = f(&container);
    drop(container);
    log::debug!("Closed log file: {:?}", path);
    result
}

/// Open a log file, run `f` against it and close it again
///
/// Built without the `hdf5` feature there is no file backend; this always
/// fails with [`PlotError::BackendUnavailable`].
#[cfg(not(feature = "hdf5"))]
pub fn with_log_file<T, F>(path: &Path, _layout: &ContainerLayout, _f: F) -> Result<T>
where
    F: FnOnce(&dyn LogContainer) -> Result<T>,
{
    Err(PlotError::BackendUnavailable(format!(
        "cannot open {:?}: built without the `hdf5` feature",
        path
    )))
}
