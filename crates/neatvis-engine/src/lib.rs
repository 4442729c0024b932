//! neatvis-engine: Headless timeline/map selection sync
//!
//! This crate provides the core logic behind a timeline widget that shares a
//! bus with a map and other record views, including:
//! - Selection reconciliation between the timeline and bus events
//! - Focus windows for spans and single instants
//! - A load gate that replays early selections once records arrive
//! - Zoom-dependent stacking

pub mod bus;
pub mod config;
pub mod headless;
pub mod lifecycle;
pub mod record;
pub mod selection;
pub mod timeline;
pub mod viewport;
pub mod widget;

// Re-export commonly used types
pub use bus::{BusEvent, BusReceiver, BusSender, Selection, SourceTag};
pub use config::{Config, ConfigError, GroupConfig, PaddingConfig, PointPadding, StackingConfig};
pub use headless::{HeadlessTimeline, RecordingMap};
pub use lifecycle::{LoadState, PendingAction};
pub use record::{
    parse_date, JsonFileStore, MemoryStore, Record, RecordFilter, RecordId, RecordStore,
    StoreError,
};
pub use selection::{SelectionDiff, SelectionSet};
pub use timeline::{build_items, Group, MapViewport, NativeEvent, Timeline, TimelineItem};
pub use viewport::{compute_window, focus_mode, should_stack, FocusMode, TimeUnit, ViewportWindow};
pub use widget::{DisplayState, VisWidget};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
