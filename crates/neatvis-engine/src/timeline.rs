//! Timeline and map collaborator seams.
//!
//! The engine never renders anything itself. It drives a [`Timeline`] through
//! this narrow interface and asks an optional [`MapViewport`] to pan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GroupConfig;
use crate::record::{Record, RecordId};
use crate::viewport::ViewportWindow;

/// A record projected onto the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Mirrors the record id.
    pub id: RecordId,
    /// Display label.
    pub content: String,
    /// Item start.
    pub start: DateTime<Utc>,
    /// Item end, if the record spans a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Group (band) tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl TimelineItem {
    /// Project a record, if it has a start date.
    ///
    /// When several groups match the record's tags, the last one wins.
    pub fn from_record(record: &Record, groups: &[GroupConfig]) -> Option<Self> {
        let start = record.start_date?;
        let group = groups
            .iter()
            .rev()
            .find(|band| record.has_tag(&band.tag))
            .map(|band| band.tag.clone());

        Some(Self {
            id: record.id,
            content: record.title.clone(),
            start,
            end: record.end_date,
            group,
        })
    }
}

/// A timeline band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Tag that items carry in their `group` field.
    pub id: String,
    /// Band label.
    pub content: String,
}

impl From<&GroupConfig> for Group {
    fn from(band: &GroupConfig) -> Self {
        Self {
            id: band.tag.clone(),
            content: band.title.clone(),
        }
    }
}

/// Project a batch of records, dropping those without a start date.
pub fn build_items(records: &[Record], groups: &[GroupConfig]) -> Vec<TimelineItem> {
    records
        .iter()
        .filter_map(|record| TimelineItem::from_record(record, groups))
        .collect()
}

/// Events raised by the timeline itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum NativeEvent {
    /// The user changed the selection; carries the complete new set.
    Select { items: Vec<RecordId> },
    /// The visible range finished changing.
    RangeChanged {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        #[serde(default)]
        zoom_changed: bool,
    },
    /// The widget was clicked or touched.
    Click,
}

/// Timeline rendering collaborator.
pub trait Timeline {
    /// Replace all items.
    fn set_items(&mut self, items: &[TimelineItem]);

    /// Replace the group bands.
    fn set_groups(&mut self, groups: &[Group]);

    /// Merge options into the timeline's configuration.
    fn set_options(&mut self, options: &serde_json::Value);

    /// Replace the selected ids.
    fn set_selection(&mut self, ids: &[RecordId]);

    /// Current visible range.
    fn window(&self) -> ViewportWindow;

    /// Navigate to a visible range.
    fn set_window(&mut self, window: ViewportWindow);

    /// Rendered height in pixels.
    fn height(&self) -> f64;
}

/// Map collaborator.
pub trait MapViewport {
    /// Pan the map by a pixel offset.
    fn pan(&mut self, dx: f64, dy: f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bands() -> Vec<GroupConfig> {
        vec![
            GroupConfig {
                tag: "war".into(),
                title: "Wars".into(),
            },
            GroupConfig {
                tag: "treaty".into(),
                title: "Treaties".into(),
            },
        ]
    }

    #[test]
    fn test_items_skip_undated_records() {
        let start = Utc.with_ymd_and_hms(1861, 4, 12, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(1865, 4, 9, 0, 0, 0).unwrap();
        let records = vec![
            Record::new(1, "Civil War").starting(start).ending(end),
            Record::new(2, "No date"),
            Record::new(3, "End only").ending(end),
            Record::new(4, "Sumter").starting(start),
        ];

        let items = build_items(&records, &[]);
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(4)]);
        assert_eq!(items[0].end, Some(end));
        assert_eq!(items[1].end, None);
        assert_eq!(items[1].content, "Sumter");
    }

    #[test]
    fn test_group_assignment_last_match_wins() {
        let start = Utc.with_ymd_and_hms(1865, 4, 9, 0, 0, 0).unwrap();
        let both = Record::new(1, "Both").starting(start).tagged("war").tagged("treaty");
        let war = Record::new(2, "War").starting(start).tagged("war");
        let none = Record::new(3, "None").starting(start).tagged("other");

        let items = build_items(&[both, war, none], &bands());
        assert_eq!(items[0].group.as_deref(), Some("treaty"));
        assert_eq!(items[1].group.as_deref(), Some("war"));
        assert_eq!(items[2].group, None);
    }

    #[test]
    fn test_group_from_config() {
        let groups: Vec<Group> = bands().iter().map(Group::from).collect();
        assert_eq!(groups[0].id, "war");
        assert_eq!(groups[1].content, "Treaties");
    }

    #[test]
    fn test_native_event_wire_shape() {
        let event: NativeEvent =
            serde_json::from_str(r#"{"event": "select", "items": [3, 1]}"#).unwrap();
        assert_eq!(
            event,
            NativeEvent::Select {
                items: vec![RecordId(3), RecordId(1)]
            }
        );
    }
}
