//! Configuration types for the timeline widget.
//!
//! Loaded once at widget initialization: bus identity, groups, stacking,
//! focus padding, and the base options handed to the timeline verbatim.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bus::SourceTag;
use crate::viewport::TimeUnit;

/// Main configuration for the timeline widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tag this widget uses as the source of its bus events.
    #[serde(default = "default_slug")]
    pub slug: SourceTag,

    /// Peers whose unselect events are not applied here.
    #[serde(default = "default_unselect_exempt")]
    pub unselect_exempt: Vec<SourceTag>,

    /// Timeline bands, in display order.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Zoom-dependent stacking, disabled when absent.
    #[serde(default)]
    pub stacking: Option<StackingConfig>,

    /// Padding around focused records.
    #[serde(default)]
    pub padding: PaddingConfig,

    /// Base timeline options, passed through untouched.
    #[serde(default = "default_options")]
    pub options: serde_json::Value,
}

fn default_slug() -> SourceTag {
    SourceTag::new("VIS")
}

fn default_unselect_exempt() -> Vec<SourceTag> {
    vec![SourceTag::new("EVENTS")]
}

fn default_options() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A timeline band matched by record tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Record tag that places an item in this band.
    pub tag: String,

    /// Band label.
    pub title: String,
}

/// Stack items once the visible range is narrower than `duration` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackingConfig {
    /// Unit the visible range is measured in.
    pub unit: TimeUnit,

    /// Threshold below which stacking is enabled.
    pub duration: i64,
}

/// Focus padding for spans and points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddingConfig {
    /// Gutter on each side of a span, as a fraction of its length.
    #[serde(default = "default_span_padding")]
    pub span: f64,

    /// Fixed padding on each side of a single instant.
    #[serde(default)]
    pub point: PointPadding,
}

fn default_span_padding() -> f64 {
    0.1
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            span: default_span_padding(),
            point: PointPadding::default(),
        }
    }
}

/// Fixed padding expressed as a count of calendar units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPadding {
    /// Whole number of units. Fractional or negative values fail to parse.
    pub value: u32,

    /// Calendar unit.
    pub unit: TimeUnit,
}

impl Default for PointPadding {
    fn default() -> Self {
        Self {
            value: 3,
            unit: TimeUnit::Days,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check whether unselects from `source` should be ignored.
    pub fn ignores_unselect_from(&self, source: &SourceTag) -> bool {
        *source == self.slug || self.unselect_exempt.contains(source)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slug: default_slug(),
            unselect_exempt: default_unselect_exempt(),
            groups: Vec::new(),
            stacking: None,
            padding: PaddingConfig::default(),
            options: default_options(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.slug, SourceTag::new("VIS"));
        assert_eq!(config.unselect_exempt, vec![SourceTag::new("EVENTS")]);
        assert!(config.groups.is_empty());
        assert!(config.stacking.is_none());
        assert!((config.padding.span - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.padding.point.value, 3);
        assert_eq!(config.padding.point.unit, TimeUnit::Days);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "groups": [{"tag": "war", "title": "Wars"}],
            "stacking": {"unit": "years", "duration": 50},
            "padding": {"point": {"value": 2, "unit": "month"}},
            "options": {"orientation": "top"}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.slug, SourceTag::new("VIS"));
        assert_eq!(config.groups.len(), 1);
        assert_eq!(
            config.stacking,
            Some(StackingConfig {
                unit: TimeUnit::Years,
                duration: 50
            })
        );
        assert!((config.padding.span - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.padding.point.unit, TimeUnit::Months);
        assert_eq!(config.options["orientation"], "top");
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vis.json");

        let config = Config {
            unselect_exempt: vec![SourceTag::new("EVENTS"), SourceTag::new("LIST")],
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vis.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_point_padding_must_be_whole() {
        for value in ["1.5", "-2"] {
            let json = format!(r#"{{"padding": {{"point": {{"value": {value}, "unit": "days"}}}}}}"#);
            assert!(serde_json::from_str::<Config>(&json).is_err(), "accepted {value}");
        }

        let json = r#"{"padding": {"point": {"value": 4, "unit": "days"}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.padding.point.value, 4);
    }

    #[test]
    fn test_ignores_unselect_from() {
        let config = Config::default();
        assert!(config.ignores_unselect_from(&SourceTag::new("VIS")));
        assert!(config.ignores_unselect_from(&SourceTag::new("EVENTS")));
        assert!(!config.ignores_unselect_from(&SourceTag::new("MAP")));
    }
}
