//! The timeline widget controller.
//!
//! Keeps the timeline's selection in lockstep with the rest of the bus:
//! - Native selection changes are diffed and published as unselect/select
//! - External selects collapse the selection to one record and focus it
//! - External unselects remove a record unless the source is exempt
//!
//! It also reacts to the map (minimize on pan, recenter on focus) and toggles
//! stacking as the visible range changes.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::bus::{BusEvent, BusSender, SourceTag};
use crate::config::Config;
use crate::lifecycle::{LoadState, PendingAction};
use crate::record::{Record, RecordFilter, RecordId, RecordStore, StoreError};
use crate::selection::SelectionSet;
use crate::timeline::{build_items, Group, MapViewport, NativeEvent, Timeline, TimelineItem};
use crate::viewport::{compute_window, should_stack, ViewportWindow};

/// Visual state the host reflects in its markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Collapsed out of the way of the map.
    pub minimized: bool,
    /// At least one item is selected.
    pub has_selection: bool,
}

/// Timeline widget bound to a bus.
pub struct VisWidget<T: Timeline> {
    config: Config,
    timeline: T,
    map: Option<Box<dyn MapViewport>>,
    bus: BusSender,
    /// Last loaded batch, for resolving ids back to records.
    records: HashMap<RecordId, Record>,
    items: Vec<TimelineItem>,
    /// Ids of `items`, for membership checks.
    item_ids: HashSet<RecordId>,
    selection: SelectionSet,
    state: LoadState,
    display: DisplayState,
}

impl<T: Timeline> VisWidget<T> {
    /// Create a widget, applying base options and groups to `timeline`.
    pub fn new(config: Config, mut timeline: T, bus: BusSender) -> Self {
        timeline.set_options(&config.options);

        if !config.groups.is_empty() {
            let groups: Vec<Group> = config.groups.iter().map(Group::from).collect();
            timeline.set_groups(&groups);
        }

        Self {
            config,
            timeline,
            map: None,
            bus,
            records: HashMap::new(),
            items: Vec::new(),
            item_ids: HashSet::new(),
            selection: SelectionSet::new(),
            state: LoadState::default(),
            display: DisplayState::default(),
        }
    }

    /// Pair a map to recenter on focus.
    #[must_use]
    pub fn with_map(mut self, map: impl MapViewport + 'static) -> Self {
        self.map = Some(Box::new(map));
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the timeline.
    pub fn timeline(&self) -> &T {
        &self.timeline
    }

    /// Get the timeline mutably (e.g. to simulate user scrolling).
    pub fn timeline_mut(&mut self) -> &mut T {
        &mut self.timeline
    }

    /// Currently selected ids.
    pub fn selected(&self) -> &[RecordId] {
        self.selection.ids()
    }

    /// Current display state.
    pub fn display(&self) -> DisplayState {
        self.display
    }

    /// Check if records have been ingested.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Number of actions waiting for the first load.
    pub fn pending_len(&self) -> usize {
        self.state.pending_len()
    }

    /// Ingested items.
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Check if `id` has an item on the timeline.
    pub fn has_item(&self, id: RecordId) -> bool {
        self.item_ids.contains(&id)
    }

    // LOADING

    /// Fetch dated records from `store` and ingest them.
    ///
    /// On error the widget stays as it was; queued actions are kept.
    pub async fn load<S: RecordStore>(&mut self, store: &S) -> Result<usize, StoreError> {
        let records = store.load_records(&RecordFilter::dated()).await?;
        Ok(self.ingest(records))
    }

    /// Replace the timeline contents with `records`.
    ///
    /// The first ingest marks the widget ready and replays queued actions.
    /// Returns the number of items placed on the timeline.
    pub fn ingest(&mut self, records: Vec<Record>) -> usize {
        self.items = build_items(&records, &self.config.groups);
        self.item_ids = self.items.iter().map(|item| item.id).collect();
        self.records = records.into_iter().map(|r| (r.id, r)).collect();
        self.timeline.set_items(&self.items);

        debug!(
            records = self.records.len(),
            items = self.items.len(),
            "Ingested records"
        );

        for action in self.state.finish() {
            match action {
                PendingAction::Select(record) => self.render_select(&record),
                PendingAction::Unselect(record) => self.render_unselect(&record),
            }
        }

        self.items.len()
    }

    // DISPATCH

    /// Handle an event from the bus.
    pub fn handle(&mut self, event: BusEvent) {
        match event {
            BusEvent::Select(sel) => self.select(sel.model, &sel.source),
            BusEvent::Unselect(sel) => self.unselect(sel.model, &sel.source),
            BusEvent::MapMoveStart { zoom_changed } => {
                // Zoom-only moves keep the timeline open.
                if zoom_changed != Some(true) {
                    self.minimize();
                }
            }
            BusEvent::MapFocused => self.center_map(),
            BusEvent::SetOptions { options } => self.timeline.set_options(&options),
        }
    }

    /// Handle an event raised by the timeline.
    pub fn handle_native(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::Select { items } => self.on_native_select(&items),
            NativeEvent::RangeChanged { .. } => self.on_range_changed(),
            NativeEvent::Click => self.maximize(),
        }
    }

    // SELECTION

    /// Reconcile a complete selection set reported by the timeline.
    ///
    /// Publishes unselects for removed ids before selects for added ids.
    pub fn on_native_select(&mut self, ids: &[RecordId]) {
        let diff = self.selection.reconcile(ids);

        for id in diff.removed {
            self.publish_record("unselect", id, BusEvent::unselect);
        }
        for id in diff.added {
            self.publish_record("select", id, BusEvent::select);
        }

        self.display.has_selection = !self.selection.is_empty();
    }

    /// Apply a selection from another component.
    pub fn select(&mut self, record: Record, source: &SourceTag) {
        if *source == self.config.slug {
            return;
        }

        if let Some(PendingAction::Select(record)) =
            self.state.defer(PendingAction::Select(record))
        {
            self.render_select(&record);
        } else {
            debug!(source = %source, "Deferring select until records load");
        }

        self.maximize();
    }

    /// Apply an unselection from another component.
    ///
    /// Before the first load the unselect is queued behind pending selects,
    /// so the replay ends where it would have if both arrived after load.
    pub fn unselect(&mut self, record: Record, source: &SourceTag) {
        if self.config.ignores_unselect_from(source) {
            return;
        }

        if let Some(PendingAction::Unselect(record)) =
            self.state.defer(PendingAction::Unselect(record))
        {
            self.render_unselect(&record);
        } else {
            debug!(source = %source, "Deferring unselect until records load");
        }
    }

    fn render_select(&mut self, record: &Record) {
        if !self.has_item(record.id) {
            debug!(id = %record.id, "Record has no timeline item, skipping select");
            return;
        }

        self.selection.select_only(record.id);
        self.timeline.set_selection(self.selection.ids());
        self.display.has_selection = true;
        self.focus(record);
    }

    fn render_unselect(&mut self, record: &Record) {
        self.selection.remove(record.id);
        let ids = self.selection.ids().to_vec();
        self.timeline.set_selection(&ids);

        // Re-run the native path so display state follows a user deselect.
        self.on_native_select(&ids);
    }

    fn publish_record(
        &self,
        kind: &'static str,
        id: RecordId,
        build: fn(Record, SourceTag) -> BusEvent,
    ) {
        let Some(record) = self.records.get(&id) else {
            debug!(id = %id, kind, "Selected id has no record, not publishing");
            return;
        };
        self.publish(build(record.clone(), self.config.slug.clone()));
    }

    fn publish(&self, event: BusEvent) {
        let name = event.name();
        if self.bus.send(event).is_err() {
            warn!(event = name, "Bus receiver dropped, event not delivered");
        }
    }

    // VIEWPORT

    /// Navigate the timeline to bring `record` into view.
    ///
    /// Dates come from the ingested record when there is one, so a payload
    /// carrying only an id still focuses. Returns the applied window, or
    /// `None` if the record has no item or no usable dates.
    pub fn focus(&mut self, record: &Record) -> Option<ViewportWindow> {
        if !self.has_item(record.id) {
            return None;
        }

        let dated = self.records.get(&record.id).unwrap_or(record);
        let window = compute_window(dated, &self.config.padding)?;
        self.timeline.set_window(window);
        Some(window)
    }

    /// Pan the paired map so centered content sits above the timeline.
    pub fn center_map(&mut self) {
        let height = self.timeline.height();
        match self.map.as_mut() {
            Some(map) => map.pan(0.0, height / 2.0),
            None => debug!("No map paired, skipping recenter"),
        }
    }

    /// Toggle stacking for the current visible range.
    pub fn on_range_changed(&mut self) {
        let Some(stacking) = self.config.stacking else {
            return;
        };

        let stack = should_stack(&self.timeline.window(), &stacking);
        self.timeline
            .set_options(&serde_json::json!({ "stack": stack }));
    }

    // DISPLAY

    /// Shrink the timeline.
    pub fn minimize(&mut self) {
        self.display.minimized = true;
    }

    /// Expand the timeline.
    pub fn maximize(&mut self) {
        self.display.minimized = false;
    }
}
