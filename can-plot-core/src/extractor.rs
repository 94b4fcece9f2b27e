//! Main extraction API
//!
//! The [`Extractor`] ties resolution, series loading and annotation lookup
//! together. It holds no container state; each call works on the container
//! it is given (or opens and closes a file itself).

use crate::aggregator::{PlotBundle, SeriesAggregator};
use crate::annotations::{resolve_annotations, AnnotationRequest};
use crate::config::PlotConfig;
use crate::container::{with_log_file, LogContainer};
use crate::resolver::IdentifierResolver;
use crate::types::{ChannelInfo, ChannelMetadata, ChannelSeries, Result};
use std::collections::HashMap;
use std::path::Path;

/// Entry point for preparing plot bundles
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: PlotConfig,
}

impl Extractor {
    /// Create an extractor with the given configuration
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Resolve tokens, load their channels and annotations into a bundle
    ///
    /// Tokens that match no channel are logged and listed in
    /// [`PlotBundle::unresolved`]. Requesting the same channel more than once
    /// yields one series per request, all sharing one sample buffer.
    ///
    /// # Example
    /// ```
    /// use can_plot_core::{AnnotationRequest, ChannelAttributes, Extractor, MemoryContainer, Sample};
    ///
    /// let container = MemoryContainer::new().with_channel(
    ///     "EngineTemp",
    ///     ChannelAttributes::new().with_code(0x100).with_unit("C"),
    ///     vec![Sample::new(2.0, 80.0), Sample::new(1.0, 75.0)],
    /// );
    ///
    /// let bundle = Extractor::default()
    ///     .prepare(&container, &["0x100"], &AnnotationRequest::None)
    ///     .unwrap();
    /// assert_eq!(bundle.series[0].label, "EngineTemp");
    /// assert_eq!(bundle.unit_label, "C");
    /// ```
    pub fn prepare<C, S>(
        &self,
        container: &C,
        tokens: &[S],
        annotations: &AnnotationRequest,
    ) -> Result<PlotBundle>
    where
        C: LogContainer + ?Sized,
        S: AsRef<str>,
    {
        log::info!("Preparing {} channel request(s)", tokens.len());

        let resolver = IdentifierResolver::for_container(container, self.config.code_collisions)?;
        let resolved = resolver.resolve_all(tokens);

        let aggregator = SeriesAggregator::new(&self.config);
        let mut loaded: HashMap<String, ChannelSeries> = HashMap::new();
        let mut series = Vec::with_capacity(resolved.resolved.len());

        for channel in &resolved.resolved {
            let entry = match loaded.get(&channel.key) {
                Some(entry) => entry.clone(),
                None => {
                    let entry = aggregator.load_series(container, &channel.key)?;
                    loaded.insert(channel.key.clone(), entry.clone());
                    entry
                }
            };
            series.push(entry);
        }

        let events = resolve_annotations(container, annotations)?;
        let bundle = aggregator.bundle(series, events, resolved.unresolved);

        log::info!(
            "Prepared {} series, {} annotations, {} unresolved",
            bundle.series.len(),
            bundle.annotations.len(),
            bundle.unresolved.len()
        );
        Ok(bundle)
    }

    /// Open a log file, prepare a bundle and close the file again
    pub fn prepare_file<S: AsRef<str>>(
        &self,
        path: &Path,
        tokens: &[S],
        annotations: &AnnotationRequest,
    ) -> Result<PlotBundle> {
        with_log_file(path, &self.config.layout, |container| {
            self.prepare(container, tokens, annotations)
        })
    }

    /// Describe every channel of a container
    pub fn inventory<C>(&self, container: &C) -> Result<Vec<ChannelInfo>>
    where
        C: LogContainer + ?Sized,
    {
        let layout = container.layout();
        container
            .channel_keys()?
            .into_iter()
            .map(|key| -> Result<ChannelInfo> {
                let metadata = ChannelMetadata::from_attributes(&container.read_attributes(&key)?);
                let sample_count = container.read_samples(&key)?.len();
                Ok(ChannelInfo {
                    label: layout.label_for_key(&key).to_string(),
                    key,
                    metadata,
                    sample_count,
                })
            })
            .collect()
    }

    /// Open a log file and describe its channels
    pub fn inventory_file(&self, path: &Path) -> Result<Vec<ChannelInfo>> {
        with_log_file(path, &self.config.layout, |container| {
            self.inventory(container)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryContainer;
    use crate::types::{ChannelAttributes, PlotError, Sample};

    fn container() -> MemoryContainer {
        MemoryContainer::new()
            .with_channel(
                "Voltage",
                ChannelAttributes::new().with_code(0x10).with_unit("V"),
                vec![Sample::new(1.0, 12.0)],
            )
            .with_channel(
                "Flag",
                ChannelAttributes::new().with_code(0x11).with_unit("None"),
                vec![],
            )
            .with_annotation(1, 1.0, "start")
    }

    #[test]
    fn test_prepare_reuses_loaded_channels() {
        let bundle = Extractor::default()
            .prepare(&container(), &["Voltage", "16"], &AnnotationRequest::None)
            .unwrap();

        assert_eq!(bundle.series.len(), 2);
        assert!(bundle.series[0].shares_samples_with(&bundle.series[1]));
        assert_eq!(bundle.unit_label, "V, V");
    }

    #[test]
    fn test_prepare_with_annotations() {
        let bundle = Extractor::default()
            .prepare(&container(), &["Flag"], &AnnotationRequest::All)
            .unwrap();

        assert_eq!(bundle.unit_label, "1");
        assert_eq!(bundle.extrema, None);
        assert_eq!(bundle.annotations.len(), 1);
    }

    #[test]
    fn test_annotation_error_aborts_prepare() {
        let result = Extractor::default().prepare(
            &container(),
            &["Voltage"],
            &AnnotationRequest::Indices(vec![2]),
        );
        assert!(matches!(
            result,
            Err(PlotError::AnnotationIndexOutOfRange { index: 2, available: 1 })
        ));
    }

    #[test]
    fn test_inventory() {
        let infos = Extractor::default().inventory(&container()).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].label, "Voltage");
        assert_eq!(infos[0].metadata.code, Some(0x10));
        assert_eq!(infos[0].sample_count, 1);
        assert_eq!(infos[1].metadata.unit, "1");
    }
}
