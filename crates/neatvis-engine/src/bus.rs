//! Typed messages exchanged between the widget and its peers.
//!
//! Outgoing events go through a [`BusSender`] injected at construction;
//! incoming events are handed to [`crate::VisWidget::handle`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::record::Record;

/// Name of a bus participant (e.g. `VIS`, `MAP`, `EVENTS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTag(String);

impl SourceTag {
    /// Create a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record selection announced on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// The selected or unselected record.
    pub model: Record,
    /// Who originated the change.
    pub source: SourceTag,
}

/// Events carried on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BusEvent {
    /// A record was selected.
    Select(Selection),
    /// A record was unselected.
    Unselect(Selection),
    /// The map started moving.
    MapMoveStart {
        /// Whether the move changes the zoom level.
        #[serde(default)]
        zoom_changed: Option<bool>,
    },
    /// The map finished focusing on a record.
    MapFocused,
    /// Replace timeline options.
    SetOptions {
        /// Options forwarded verbatim to the timeline.
        options: serde_json::Value,
    },
}

impl BusEvent {
    /// Build a select event.
    pub fn select(model: Record, source: SourceTag) -> Self {
        Self::Select(Selection { model, source })
    }

    /// Build an unselect event.
    pub fn unselect(model: Record, source: SourceTag) -> Self {
        Self::Unselect(Selection { model, source })
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Unselect(_) => "unselect",
            Self::MapMoveStart { .. } => "map-move-start",
            Self::MapFocused => "map-focused",
            Self::SetOptions { .. } => "set-options",
        }
    }
}

/// Sending half of the bus.
pub type BusSender = mpsc::UnboundedSender<BusEvent>;

/// Receiving half of the bus.
pub type BusReceiver = mpsc::UnboundedReceiver<BusEvent>;

/// Create a connected bus pair.
pub fn channel() -> (BusSender, BusReceiver) {
    mpsc::unbounded_channel()
}
