//! Headless collaborators.
//!
//! [`HeadlessTimeline`] and [`RecordingMap`] stand in for the rendering
//! widgets so the engine can be driven without a UI, for replays and E2E
//! testing. Every call is recorded for inspection.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::record::RecordId;
use crate::timeline::{Group, MapViewport, Timeline, TimelineItem};
use crate::viewport::ViewportWindow;

/// Default rendered height in pixels.
pub const DEFAULT_HEIGHT: f64 = 200.0;

/// A timeline that only remembers what it was told.
#[derive(Debug, Clone)]
pub struct HeadlessTimeline {
    items: Vec<TimelineItem>,
    groups: Vec<Group>,
    options: serde_json::Value,
    selection: Vec<RecordId>,
    window: ViewportWindow,
    /// Every window passed to `set_window`, in order.
    window_history: Vec<ViewportWindow>,
    height: f64,
}

impl Default for HeadlessTimeline {
    fn default() -> Self {
        let start = DateTime::<Utc>::default();
        Self {
            items: Vec::new(),
            groups: Vec::new(),
            options: serde_json::Value::Object(serde_json::Map::new()),
            selection: Vec::new(),
            window: ViewportWindow::new(start, start),
            window_history: Vec::new(),
            height: DEFAULT_HEIGHT,
        }
    }
}

impl HeadlessTimeline {
    /// Create a timeline with the default height.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rendered height.
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Simulate the user scrolling or zooming to `window`.
    pub fn scroll_to(&mut self, window: ViewportWindow) {
        self.window = window;
    }

    /// Current items.
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Current groups.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Merged options.
    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    /// Current selection.
    pub fn selection(&self) -> &[RecordId] {
        &self.selection
    }

    /// Windows applied by the engine.
    pub fn window_history(&self) -> &[ViewportWindow] {
        &self.window_history
    }
}

impl Timeline for HeadlessTimeline {
    fn set_items(&mut self, items: &[TimelineItem]) {
        self.items = items.to_vec();
    }

    fn set_groups(&mut self, groups: &[Group]) {
        self.groups = groups.to_vec();
    }

    fn set_options(&mut self, options: &serde_json::Value) {
        merge_options(&mut self.options, options);
    }

    fn set_selection(&mut self, ids: &[RecordId]) {
        self.selection = ids.to_vec();
    }

    fn window(&self) -> ViewportWindow {
        self.window
    }

    fn set_window(&mut self, window: ViewportWindow) {
        self.window = window;
        self.window_history.push(window);
    }

    fn height(&self) -> f64 {
        self.height
    }
}

/// Shallow-merge object keys; anything else replaces the target.
fn merge_options(target: &mut serde_json::Value, update: &serde_json::Value) {
    match (target.as_object_mut(), update.as_object()) {
        (Some(existing), Some(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        _ => *target = update.clone(),
    }
}

/// A map that records pan requests.
///
/// Clones share the same log, so a test can keep one handle while the widget
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingMap {
    pans: Rc<RefCell<Vec<(f64, f64)>>>,
}

impl RecordingMap {
    /// Create a map with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All pan requests so far.
    pub fn pans(&self) -> Vec<(f64, f64)> {
        self.pans.borrow().clone()
    }
}

impl MapViewport for RecordingMap {
    fn pan(&mut self, dx: f64, dy: f64) {
        self.pans.borrow_mut().push((dx, dy));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_options_merge() {
        let mut timeline = HeadlessTimeline::new();
        timeline.set_options(&json!({"orientation": "top", "stack": true}));
        timeline.set_options(&json!({"stack": false}));

        assert_eq!(
            timeline.options(),
            &json!({"orientation": "top", "stack": false})
        );
    }

    #[test]
    fn test_non_object_options_replace() {
        let mut timeline = HeadlessTimeline::new();
        timeline.set_options(&json!(null));
        assert_eq!(timeline.options(), &json!(null));

        timeline.set_options(&json!({"stack": true}));
        assert_eq!(timeline.options(), &json!({"stack": true}));
    }

    #[test]
    fn test_window_history() {
        let mut timeline = HeadlessTimeline::new();
        let a = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();

        timeline.scroll_to(ViewportWindow::new(a, b));
        assert!(timeline.window_history().is_empty());

        timeline.set_window(ViewportWindow::new(b, a));
        assert_eq!(timeline.window_history().len(), 1);
        assert_eq!(timeline.window().start, a);
    }

    #[test]
    fn test_recording_map_shares_log() {
        let map = RecordingMap::new();
        let mut handle = map.clone();
        handle.pan(0.0, 100.0);
        assert_eq!(map.pans(), vec![(0.0, 100.0)]);
    }
}
