//! In-memory log container
//!
//! Holds channels and annotations in plain vectors. Useful for embedding
//! callers that already have their data loaded, and for tests.

use super::LogContainer;
use crate::config::ContainerLayout;
use crate::types::{AnnotationRow, ChannelAttributes, PlotError, Result, Sample};

#[derive(Debug, Clone)]
struct MemoryChannel {
    key: String,
    attributes: ChannelAttributes,
    samples: Vec<Sample>,
}

/// Log container backed by memory
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    layout: ContainerLayout,
    channels: Vec<MemoryChannel>,
    annotations: Vec<AnnotationRow>,
}

impl MemoryContainer {
    /// Empty container with the default (grouped) layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty container with a specific layout
    pub fn with_layout(layout: ContainerLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Builder method: add a channel
    ///
    /// Adding a key twice replaces the earlier channel in place.
    pub fn with_channel(
        mut self,
        key: impl Into<String>,
        attributes: ChannelAttributes,
        samples: Vec<Sample>,
    ) -> Self {
        self.insert_channel(key, attributes, samples);
        self
    }

    /// Builder method: append an annotation row
    pub fn with_annotation(mut self, index: u32, position: f64, label: impl Into<Vec<u8>>) -> Self {
        self.annotations.push(AnnotationRow {
            index,
            position,
            label: label.into(),
        });
        self
    }

    /// Add or replace a channel
    pub fn insert_channel(
        &mut self,
        key: impl Into<String>,
        attributes: ChannelAttributes,
        samples: Vec<Sample>,
    ) {
        let key = key.into();
        let channel = MemoryChannel {
            key,
            attributes,
            samples,
        };
        match self.channels.iter_mut().find(|c| c.key == channel.key) {
            Some(existing) => *existing = channel,
            None => self.channels.push(channel),
        }
    }

    fn channel(&self, key: &str) -> Result<&MemoryChannel> {
        self.channels
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| PlotError::ChannelNotFound(key.to_string()))
    }
}

impl LogContainer for MemoryContainer {
    fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    fn channel_keys(&self) -> Result<Vec<String>> {
        Ok(self.channels.iter().map(|c| c.key.clone()).collect())
    }

    fn read_attributes(&self, key: &str) -> Result<ChannelAttributes> {
        Ok(self.channel(key)?.attributes.clone())
    }

    fn read_samples(&self, key: &str) -> Result<Vec<Sample>> {
        Ok(self.channel(key)?.samples.clone())
    }

    fn annotation_rows(&self) -> Result<Vec<AnnotationRow>> {
        Ok(self.annotations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order_and_replacement() {
        let container = MemoryContainer::new()
            .with_channel("B", ChannelAttributes::new().with_code(2), vec![])
            .with_channel("A", ChannelAttributes::new().with_code(1), vec![])
            .with_channel("B", ChannelAttributes::new().with_code(3), vec![]);

        assert_eq!(container.channel_keys().unwrap(), vec!["B", "A"]);
        assert_eq!(container.read_attributes("B").unwrap().code, Some(3));
    }

    #[test]
    fn test_missing_channel() {
        let container = MemoryContainer::new();
        assert!(matches!(
            container.read_samples("Nope"),
            Err(PlotError::ChannelNotFound(key)) if key == "Nope"
        ));
    }

    #[test]
    fn test_samples_keep_stored_order() {
        let samples = vec![Sample::new(2.0, 1.0), Sample::new(1.0, 2.0)];
        let container =
            MemoryContainer::new().with_channel("A", ChannelAttributes::new(), samples.clone());
        assert_eq!(container.read_samples("A").unwrap(), samples);
    }
}
