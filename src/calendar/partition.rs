use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CalendarError, DateRange};

/// Administrative closure as delivered by the institutional calendar.
///
/// Either side may be missing when upstream data is incomplete; such intervals are
/// skipped when partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutInterval {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl BlackoutInterval {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub const fn partial(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Ordered list of blackout intervals for one exam or tutorial family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    blackouts: Vec<BlackoutInterval>,
}

impl CalendarWindow {
    /// Keeps the intervals in the order given; partitioning tolerates bad data.
    pub fn new(blackouts: Vec<BlackoutInterval>) -> Self {
        Self { blackouts }
    }

    pub fn blackouts(&self) -> &[BlackoutInterval] {
        &self.blackouts
    }

    pub fn is_empty(&self) -> bool {
        self.blackouts.is_empty()
    }

    /// Reports the first incomplete, inverted, unsorted, or overlapping interval.
    pub fn validate(&self) -> Result<(), CalendarError> {
        let mut previous: Option<(NaiveDate, NaiveDate)> = None;

        for (index, blackout) in self.blackouts.iter().enumerate() {
            let (start, end) = blackout
                .bounds()
                .ok_or(CalendarError::IncompleteBlackout { index })?;

            if end < start {
                return Err(CalendarError::EndPrecedesStart { start, end });
            }

            if let Some((_, previous_end)) = previous {
                if start <= previous_end {
                    return Err(CalendarError::OverlappingBlackouts { index });
                }
            }

            previous = Some((start, end));
        }

        Ok(())
    }

    /// Open intervals between blackouts, beginning at `lower_bound`.
    ///
    /// The final interval has no end. When intervals are unsorted, overlapping, or
    /// inverted, the next open start is always the later candidate, so bad data can
    /// only shrink the open intervals.
    pub fn open_ranges(&self, lower_bound: NaiveDate) -> Vec<DateRange> {
        let mut ranges = Vec::with_capacity(self.blackouts.len() + 1);
        let mut next_open = Some(lower_bound);

        for (index, blackout) in self.blackouts.iter().enumerate() {
            let Some((start, end)) = blackout.bounds() else {
                warn!(
                    index,
                    start = ?blackout.start,
                    end = ?blackout.end,
                    "skipping blackout interval with a missing boundary"
                );
                continue;
            };

            let Some(open_from) = next_open else {
                break;
            };

            if start > open_from {
                if let Some(open_until) = start.checked_sub_days(Days::new(1)) {
                    ranges.push(DateRange::from_ordered(open_from, open_until));
                }
            }

            let closed_through = start.max(end);
            next_open = closed_through
                .checked_add_days(Days::new(1))
                .map(|reopen| reopen.max(open_from));
        }

        if let Some(open_from) = next_open {
            ranges.push(DateRange::starting(open_from));
        }

        for blackout in &self.blackouts {
            if let Some((start, end)) = blackout.bounds() {
                ranges = clip(ranges, start.min(end), start.max(end));
            }
        }

        ranges
    }

    /// Partitions the open intervals from `lower_bound` around `today`.
    pub fn partition(&self, lower_bound: NaiveDate, today: NaiveDate) -> DateRangeGroup {
        DateRangeGroup::classify(self.open_ranges(lower_bound), today)
    }
}

impl DateRange {
    fn from_ordered(start: NaiveDate, end: NaiveDate) -> Self {
        Self::between(start, end).unwrap_or_else(|_| Self::starting(start))
    }
}

/// Removes the closed days `low..=high` from every range.
///
/// A no-op for sorted, disjoint blackouts; out-of-order data that the walk could not
/// see coming is cut out here.
fn clip(ranges: Vec<DateRange>, low: NaiveDate, high: NaiveDate) -> Vec<DateRange> {
    let mut clipped = Vec::with_capacity(ranges.len() + 1);

    for range in ranges {
        let overlaps = !range.ends_before(low) && !range.starts_after(high);
        if !overlaps {
            clipped.push(range);
            continue;
        }

        if range.start().map_or(true, |start| start < low) {
            if let Some(before) = low.checked_sub_days(Days::new(1)) {
                if let Ok(head) = DateRange::new(range.start(), Some(before)) {
                    clipped.push(head);
                }
            }
        }

        if range.end().map_or(true, |end| end > high) {
            if let Some(after) = high.checked_add_days(Days::new(1)) {
                if let Ok(tail) = DateRange::new(Some(after), range.end()) {
                    clipped.push(tail);
                }
            }
        }
    }

    clipped
}

/// Open ranges grouped relative to a reference date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeGroup {
    pub past: Vec<DateRange>,
    pub current: Option<DateRange>,
    pub future: Vec<DateRange>,
}

impl DateRangeGroup {
    /// Sorts `ranges` into past, current, and future relative to `today`.
    ///
    /// Only the first range containing `today` becomes current; any further range
    /// containing it is dropped.
    pub fn classify(mut ranges: Vec<DateRange>, today: NaiveDate) -> Self {
        ranges.sort();

        let mut group = Self::default();
        for range in ranges {
            if range.ends_before(today) {
                group.past.push(range);
            } else if range.starts_after(today) {
                group.future.push(range);
            } else if group.current.is_none() {
                group.current = Some(range);
            } else {
                warn!(%range, "dropping second range containing today");
            }
        }

        group
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The earliest range that has not started yet.
    pub fn next_opening(&self) -> Option<&DateRange> {
        self.future.first()
    }

    pub fn all(&self) -> Vec<DateRange> {
        self.past
            .iter()
            .chain(self.current.iter())
            .chain(self.future.iter())
            .copied()
            .collect()
    }
}

/// Partitions `window` into open ranges starting at `lower_bound`.
pub fn partition(
    window: &CalendarWindow,
    lower_bound: NaiveDate,
    today: NaiveDate,
) -> DateRangeGroup {
    window.partition(lower_bound, today)
}
