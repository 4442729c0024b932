//! Scripted replays against a headless widget.
//!
//! A script is a JSON array of steps, e.g.
//!
//! ```json
//! [
//!   {"step": "bus", "event": {"event": "select", "model": {"id": 1}, "source": "MAP"}},
//!   {"step": "load"},
//!   {"step": "native", "event": {"event": "select", "items": []}}
//! ]
//! ```

use chrono::{DateTime, Utc};
use neatvis_engine::{
    bus, BusEvent, BusReceiver, Config, HeadlessTimeline, NativeEvent, RecordId, RecordStore,
    RecordingMap, StoreError, Timeline, ViewportWindow, VisWidget,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    /// Load records from the store.
    Load,
    /// Deliver an event from the bus.
    Bus { event: BusEvent },
    /// Deliver an event from the timeline.
    Native { event: NativeEvent },
    /// Simulate the user moving the visible range.
    Scroll {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Events the widget published, in order.
    pub published: Vec<BusEvent>,
    /// Final selection.
    pub selected: Vec<RecordId>,
    /// Final visible range.
    pub window: ViewportWindow,
    pub minimized: bool,
    pub has_selection: bool,
    /// Map pan requests.
    pub pans: Vec<(f64, f64)>,
    /// Whether records were ever loaded.
    pub ready: bool,
}

/// Run `steps` against a fresh widget.
pub async fn replay<S: RecordStore>(
    config: Config,
    store: &S,
    steps: Vec<Step>,
) -> Result<ReplayReport, StoreError> {
    let (tx, mut rx) = bus::channel();
    let map = RecordingMap::new();
    let mut widget = VisWidget::new(config, HeadlessTimeline::new(), tx).with_map(map.clone());
    let mut published = Vec::new();

    for (index, step) in steps.into_iter().enumerate() {
        debug!(index, ?step, "Replaying step");
        match step {
            Step::Load => {
                let items = widget.load(store).await?;
                info!(items, "Loaded records");
            }
            Step::Bus { event } => widget.handle(event),
            Step::Native { event } => widget.handle_native(event),
            Step::Scroll { start, end } => {
                widget
                    .timeline_mut()
                    .scroll_to(ViewportWindow::new(start, end));
            }
        }
        drain(&mut rx, &mut published);
    }

    let display = widget.display();
    Ok(ReplayReport {
        published,
        selected: widget.selected().to_vec(),
        window: widget.timeline().window(),
        minimized: display.minimized,
        has_selection: display.has_selection,
        pans: map.pans(),
        ready: widget.is_ready(),
    })
}

fn drain(rx: &mut BusReceiver, out: &mut Vec<BusEvent>) {
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
}
