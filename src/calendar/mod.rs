//! Calendar windows: open date ranges, blackout intervals, and their partition
//! around a reference date.

pub mod campus;
mod partition;
mod range;

pub use campus::{CampusCalendar, CampusCalendarEntry, CampusCalendarError};
pub use partition::{partition, BlackoutInterval, CalendarWindow, DateRangeGroup};
pub use range::DateRange;
pub(crate) use range::STUDENT_DATE_FORMAT;

use chrono::NaiveDate;

/// Configuration problems in calendar data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("date range ends on {end} before it starts on {start}")]
    EndPrecedesStart { start: NaiveDate, end: NaiveDate },
    #[error("blackout interval #{index} is missing a start or end date")]
    IncompleteBlackout { index: usize },
    #[error("blackout interval #{index} overlaps or precedes the interval before it")]
    OverlappingBlackouts { index: usize },
}
