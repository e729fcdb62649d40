use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CalendarError;

/// Display format for dates shown to students.
pub(crate) const STUDENT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Inclusive range of dates; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, CalendarError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(CalendarError::EndPrecedesStart { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(Some(start), Some(end))
    }

    /// Open-ended range beginning on `start`.
    pub const fn starting(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub const fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub const fn forever() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn ends_before(&self, date: NaiveDate) -> bool {
        self.end.is_some_and(|end| end < date)
    }

    pub fn starts_after(&self, date: NaiveDate) -> bool {
        self.start.is_some_and(|start| start > date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.ends_before(date) && !self.starts_after(date)
    }
}

impl Ord for DateRange {
    /// Unbounded starts sort first and unbounded ends sort last.
    fn cmp(&self, other: &Self) -> Ordering {
        let start = match (self.start, other.start) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        };

        start.then_with(|| match (self.end, other.end) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        })
    }
}

impl PartialOrd for DateRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "forever"),
            (None, Some(end)) => write!(f, "until {}", end.format(STUDENT_DATE_FORMAT)),
            (Some(start), None) => write!(f, "starting {}", start.format(STUDENT_DATE_FORMAT)),
            (Some(start), Some(end)) if start == end => {
                write!(f, "{}", start.format(STUDENT_DATE_FORMAT))
            }
            (Some(start), Some(end)) => write!(
                f,
                "{} through {}",
                start.format(STUDENT_DATE_FORMAT),
                end.format(STUDENT_DATE_FORMAT)
            ),
        }
    }
}
