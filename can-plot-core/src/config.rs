//! Extraction configuration types
//!
//! This module defines the knobs that differ between container variants and
//! plotting conventions. Defaults match the grouped container layout written
//! by the logger.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Configuration for channel extraction and aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Where channels and annotations live inside the container
    #[serde(default)]
    pub layout: ContainerLayout,

    /// Separator placed between units in the combined axis label
    #[serde(default = "default_unit_separator")]
    pub unit_separator: String,

    /// Multiply sample values by the channel's scale attribute
    #[serde(default = "default_true")]
    pub apply_scale: bool,

    /// Relative headroom above the largest value for the y axis
    #[serde(default = "default_headroom")]
    pub headroom: f64,

    /// What to do when two channels share a numeric code
    #[serde(default)]
    pub code_collisions: CodeCollisionPolicy,
}

fn default_true() -> bool {
    true
}

fn default_unit_separator() -> String {
    ", ".to_string()
}

fn default_headroom() -> f64 {
    0.05
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            layout: ContainerLayout::default(),
            unit_separator: default_unit_separator(),
            apply_scale: true,
            headroom: default_headroom(),
            code_collisions: CodeCollisionPolicy::default(),
        }
    }
}

impl PlotConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the container layout
    pub fn with_layout(mut self, layout: ContainerLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder method: set the unit label separator
    pub fn with_unit_separator(mut self, separator: impl Into<String>) -> Self {
        self.unit_separator = separator.into();
        self
    }

    /// Builder method: enable or disable scale application
    pub fn with_scale(mut self, enabled: bool) -> Self {
        self.apply_scale = enabled;
        self
    }

    /// Builder method: set the y axis headroom
    pub fn with_headroom(mut self, headroom: f64) -> Self {
        self.headroom = headroom;
        self
    }

    /// Builder method: set the numeric code collision policy
    pub fn with_code_collisions(mut self, policy: CodeCollisionPolicy) -> Self {
        self.code_collisions = policy;
        self
    }
}

/// Numeric code collision handling when building the identifier map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCollisionPolicy {
    /// The channel that comes last in key order keeps the code (logged)
    #[default]
    LastWins,
    /// Fail while building the map
    Reject,
}

/// Container layout description
///
/// Two layouts exist in the wild: channels grouped below `CAN_IDs`, and
/// channels at the file root whose keys are wrapped in double quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLayout {
    /// Group holding the channels (`None` = file root)
    #[serde(default = "default_channel_group")]
    pub channel_group: Option<String>,

    /// Channel keys are stored wrapped in double quotes
    #[serde(default)]
    pub quoted_keys: bool,

    /// Name of the annotation table
    #[serde(default = "default_annotation_table")]
    pub annotation_table: String,
}

fn default_channel_group() -> Option<String> {
    Some("CAN_IDs".to_string())
}

fn default_annotation_table() -> String {
    "COMMENTS".to_string()
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self::grouped("CAN_IDs")
    }
}

impl ContainerLayout {
    /// Channels below a named group
    pub fn grouped(group: impl Into<String>) -> Self {
        Self {
            channel_group: Some(group.into()),
            quoted_keys: false,
            annotation_table: default_annotation_table(),
        }
    }

    /// Channels at the file root with quoted keys
    pub fn top_level() -> Self {
        Self {
            channel_group: None,
            quoted_keys: true,
            annotation_table: default_annotation_table(),
        }
    }

    /// Group holding the channels; an empty name or `/` means the file root
    pub fn channel_group(&self) -> Option<&str> {
        self.channel_group
            .as_deref()
            .filter(|group| !group.is_empty() && *group != "/")
    }

    /// Container key a symbolic token maps to
    pub fn key_for_token<'a>(&self, token: &'a str) -> Cow<'a, str> {
        if self.quoted_keys {
            Cow::Owned(format!("\"{}\"", token))
        } else {
            Cow::Borrowed(token)
        }
    }

    /// Legend label for a container key
    pub fn label_for_key<'a>(&self, key: &'a str) -> &'a str {
        key.trim_matches('"')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_config_builder() {
        let config = PlotConfig::new()
            .with_layout(ContainerLayout::top_level())
            .with_unit_separator("/")
            .with_scale(false)
            .with_headroom(0.1)
            .with_code_collisions(CodeCollisionPolicy::Reject);

        assert_eq!(config.layout.channel_group, None);
        assert!(config.layout.quoted_keys);
        assert_eq!(config.unit_separator, "/");
        assert!(!config.apply_scale);
        assert_eq!(config.headroom, 0.1);
        assert_eq!(config.code_collisions, CodeCollisionPolicy::Reject);
    }

    #[test]
    fn test_defaults() {
        let config = PlotConfig::new();
        assert_eq!(config.layout.channel_group.as_deref(), Some("CAN_IDs"));
        assert_eq!(config.layout.annotation_table, "COMMENTS");
        assert_eq!(config.unit_separator, ", ");
        assert!(config.apply_scale);
        assert_eq!(config.code_collisions, CodeCollisionPolicy::LastWins);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: PlotConfig =
            serde_json::from_str(r#"{ "apply_scale": false, "layout": { "quoted_keys": true } }"#)
                .unwrap();
        assert!(!config.apply_scale);
        assert!(config.layout.quoted_keys);
        assert_eq!(config.layout.channel_group.as_deref(), Some("CAN_IDs"));
        assert_eq!(config.unit_separator, ", ");
    }

    #[test]
    fn test_key_mapping() {
        let quoted = ContainerLayout::top_level();
        assert_eq!(quoted.key_for_token("EngineTemp"), "\"EngineTemp\"");
        assert_eq!(quoted.label_for_key("\"EngineTemp\""), "EngineTemp");

        let grouped = ContainerLayout::default();
        assert_eq!(grouped.key_for_token("EngineTemp"), "EngineTemp");
        assert_eq!(grouped.label_for_key("EngineTemp"), "EngineTemp");
    }

    #[test]
    fn test_root_group_spellings() {
        assert_eq!(ContainerLayout::grouped("/").channel_group(), None);
        assert_eq!(ContainerLayout::grouped("").channel_group(), None);
        assert_eq!(ContainerLayout::top_level().channel_group(), None);
        assert_eq!(ContainerLayout::default().channel_group(), Some("CAN_IDs"));
    }
}
