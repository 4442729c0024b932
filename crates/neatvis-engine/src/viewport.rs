//! Viewport focusing.
//!
//! Computes the visible time window that brings a record's date range into
//! view:
//! - Spans get a gutter proportional to their length on each side
//! - Single instants get a fixed calendar padding on each side
//! - Undated records produce no window

use chrono::{DateTime, Months, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{PaddingConfig, StackingConfig};
use crate::record::Record;

/// Calendar unit used for padding and stacking thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "millisecond", alias = "ms")]
    Milliseconds,
    #[serde(alias = "second")]
    Seconds,
    #[serde(alias = "minute")]
    Minutes,
    #[serde(alias = "hour")]
    Hours,
    #[serde(alias = "day")]
    Days,
    #[serde(alias = "week")]
    Weeks,
    #[serde(alias = "month")]
    Months,
    #[serde(alias = "year")]
    Years,
}

impl TimeUnit {
    /// Fixed length of one unit, or `None` for calendar-relative units.
    fn fixed_delta(self) -> Option<TimeDelta> {
        match self {
            Self::Milliseconds => Some(TimeDelta::milliseconds(1)),
            Self::Seconds => Some(TimeDelta::seconds(1)),
            Self::Minutes => Some(TimeDelta::minutes(1)),
            Self::Hours => Some(TimeDelta::hours(1)),
            Self::Days => Some(TimeDelta::days(1)),
            Self::Weeks => Some(TimeDelta::weeks(1)),
            Self::Months | Self::Years => None,
        }
    }

    fn months_per_unit(self) -> u32 {
        if self == Self::Years {
            12
        } else {
            1
        }
    }

    /// Move `at` by `count` units, forward or backward.
    ///
    /// Returns `None` if the result is out of range.
    pub fn shift(self, at: DateTime<Utc>, count: u32, forward: bool) -> Option<DateTime<Utc>> {
        if let Some(unit) = self.fixed_delta() {
            let delta = unit.checked_mul(i32::try_from(count).ok()?)?;
            return if forward {
                at.checked_add_signed(delta)
            } else {
                at.checked_sub_signed(delta)
            };
        }

        let months = Months::new(count.checked_mul(self.months_per_unit())?);
        if forward {
            at.checked_add_months(months)
        } else {
            at.checked_sub_months(months)
        }
    }

    /// Whole units between `start` and `end`, truncated toward zero.
    pub fn count_between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        if let Some(unit) = self.fixed_delta() {
            let span = end - start;
            return span.num_milliseconds() / unit.num_milliseconds();
        }

        months_between(start, end) / i64::from(self.months_per_unit())
    }
}

/// Whole calendar months between two instants, truncated toward zero.
fn months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    use chrono::Datelike;

    let (from, to, sign) = if end >= start {
        (start, end, 1)
    } else {
        (end, start, -1)
    };

    let mut months = i64::from(to.year() - from.year()) * 12
        + i64::from(to.month()) - i64::from(from.month());

    // Step back while the anniversary lands past `to` (day/time not reached).
    while months > 0 {
        let anniversary = u32::try_from(months)
            .ok()
            .and_then(|m| from.checked_add_months(Months::new(m)));
        match anniversary {
            Some(a) if a <= to => break,
            _ => months -= 1,
        }
    }

    sign * months
}

/// Visible time range of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ViewportWindow {
    /// Create a window, ordering the bounds.
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl std::fmt::Display for ViewportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// How a record's dates were interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Distinct start and end.
    Span,
    /// A single instant.
    Point,
}

/// Classify a record's date range.
pub fn focus_mode(record: &Record) -> Option<FocusMode> {
    match (record.start_date, record.end_date) {
        (None, _) => None,
        (Some(start), Some(end)) if start != end => Some(FocusMode::Span),
        (Some(_), _) => Some(FocusMode::Point),
    }
}

/// Compute the window that brings `record` into view.
///
/// Returns `None` for records without a start date.
pub fn compute_window(record: &Record, padding: &PaddingConfig) -> Option<ViewportWindow> {
    let start = record.start_date?;

    match (focus_mode(record)?, record.end_date) {
        (FocusMode::Span, Some(end)) => {
            let span = ViewportWindow::new(start, end);
            let gutter = scale_delta(span.duration(), padding.span.max(0.0))?;
            Some(ViewportWindow::new(
                span.start.checked_sub_signed(gutter)?,
                span.end.checked_add_signed(gutter)?,
            ))
        }
        _ => {
            let point = padding.point;
            Some(ViewportWindow::new(
                point.unit.shift(start, point.value, false)?,
                point.unit.shift(start, point.value, true)?,
            ))
        }
    }
}

/// Multiply a duration by a ratio at millisecond precision.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale_delta(delta: TimeDelta, ratio: f64) -> Option<TimeDelta> {
    let millis = (delta.num_milliseconds() as f64 * ratio).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

/// Decide whether items should stack for the given visible range.
pub fn should_stack(window: &ViewportWindow, stacking: &StackingConfig) -> bool {
    stacking.unit.count_between(window.start, window.end) < stacking.duration
}
