//! Adapter for the institutional campus calendar.
//!
//! The registrar publishes dated rows keyed by a short description (`dt_desc`). This
//! module turns those rows into the windows the eligibility engines consume.

use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::{BlackoutInterval, CalendarError, CalendarWindow, DateRange};

pub const TUTORIAL_START: &str = "tut_start";
pub const TUTORIAL_END: &str = "tut_end";

/// Start/end descriptions of the placement maintenance blackouts, in order.
pub const PLACEMENT_MAINTENANCE: [(&str, &str); 3] = [
    ("plc_maint_start1", "plc_maint_end1"),
    ("plc_maint_start2", "plc_maint_end2"),
    ("plc_maint_start3", "plc_maint_end3"),
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, thiserror::Error)]
pub enum CampusCalendarError {
    #[error("invalid campus calendar CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("campus calendar row {row} has unreadable date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("campus calendar row {row} is missing its date")]
    MissingDate { row: usize },
}

/// One dated row of the campus calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusCalendarEntry {
    pub description: String,
    pub date: NaiveDate,
}

impl CampusCalendarEntry {
    pub fn new(description: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            date,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampusCalendar {
    entries: Vec<CampusCalendarEntry>,
}

impl CampusCalendar {
    pub fn from_entries(entries: Vec<CampusCalendarEntry>) -> Self {
        Self { entries }
    }

    /// Reads a `dt_desc,campus_dt` export. Dates may be ISO or `MM/DD/YYYY`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CampusCalendarError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for (index, record) in csv_reader.deserialize::<CampusCalendarRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            let raw = row
                .campus_dt
                .ok_or(CampusCalendarError::MissingDate { row: line })?;
            let date = parse_date(&raw).ok_or_else(|| CampusCalendarError::InvalidDate {
                row: line,
                value: raw.clone(),
            })?;

            entries.push(CampusCalendarEntry {
                description: row.dt_desc,
                date,
            });
        }

        debug!(entries = entries.len(), "loaded campus calendar");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CampusCalendarEntry] {
        &self.entries
    }

    /// Date recorded under `description`; the last matching row wins.
    pub fn date_for(&self, description: &str) -> Option<NaiveDate> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.description.eq_ignore_ascii_case(description))
            .map(|entry| entry.date)
    }

    /// Placement maintenance blackouts.
    ///
    /// A pair with only one side recorded is kept as an incomplete interval so the
    /// partitioner skips and reports it.
    pub fn maintenance_window(&self) -> CalendarWindow {
        let blackouts = PLACEMENT_MAINTENANCE
            .iter()
            .filter_map(|(start_key, end_key)| {
                match (self.date_for(start_key), self.date_for(end_key)) {
                    (None, None) => None,
                    (start, end) => Some(BlackoutInterval::partial(start, end)),
                }
            })
            .collect();

        CalendarWindow::new(blackouts)
    }

    /// Open window of the precalculus tutorial site, if both ends are recorded.
    pub fn tutorial_range(&self) -> Result<Option<DateRange>, CalendarError> {
        match (self.date_for(TUTORIAL_START), self.date_for(TUTORIAL_END)) {
            (Some(start), Some(end)) => DateRange::between(start, end).map(Some),
            (None, None) => Ok(None),
            (start, end) => {
                warn!(?start, ?end, "tutorial window is missing a boundary");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CampusCalendarRow {
    dt_desc: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    campus_dt: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
    }

    #[test]
    fn reads_csv_export_in_both_date_formats() {
        let csv = "dt_desc,campus_dt\n\
                   plc_maint_start1,2025-03-01\n\
                   plc_maint_end1, 03/10/2025\n\
                   tut_start,2025-06-01\n\
                   tut_end,2025-08-20\n";

        let calendar = CampusCalendar::from_csv_reader(csv.as_bytes()).expect("calendar parses");

        assert_eq!(calendar.entries().len(), 4);
        assert_eq!(calendar.date_for("plc_maint_end1"), Some(date(3, 10)));
        assert_eq!(
            calendar.maintenance_window().blackouts(),
            &[BlackoutInterval::new(date(3, 1), date(3, 10))]
        );
        assert_eq!(
            calendar.tutorial_range().expect("ordered"),
            Some(DateRange::between(date(6, 1), date(8, 20)).expect("valid"))
        );
    }

    #[test]
    fn reports_unreadable_dates_with_row_numbers() {
        let csv = "dt_desc,campus_dt\ntut_start,2025-06-01\ntut_end,someday\n";

        match CampusCalendar::from_csv_reader(csv.as_bytes()) {
            Err(CampusCalendarError::InvalidDate { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "someday");
            }
            other => panic!("expected invalid date error, got {other:?}"),
        }
    }

    #[test]
    fn reports_missing_dates() {
        let csv = "dt_desc,campus_dt\ntut_start,\n";
        assert!(matches!(
            CampusCalendar::from_csv_reader(csv.as_bytes()),
            Err(CampusCalendarError::MissingDate { row: 2 })
        ));
    }

    #[test]
    fn keeps_incomplete_maintenance_pairs_for_the_partitioner() {
        let calendar = CampusCalendar::from_entries(vec![
            CampusCalendarEntry::new("plc_maint_start1", date(3, 1)),
            CampusCalendarEntry::new("plc_maint_end1", date(3, 10)),
            CampusCalendarEntry::new("plc_maint_start2", date(5, 1)),
        ]);

        let window = calendar.maintenance_window();

        assert_eq!(
            window.blackouts(),
            &[
                BlackoutInterval::new(date(3, 1), date(3, 10)),
                BlackoutInterval::partial(Some(date(5, 1)), None),
            ]
        );
        assert_eq!(
            window.open_ranges(date(2, 1)),
            vec![
                DateRange::between(date(2, 1), date(2, 28)).expect("valid"),
                DateRange::starting(date(3, 11)),
            ]
        );
    }

    #[test]
    fn inverted_tutorial_window_is_a_configuration_error() {
        let calendar = CampusCalendar::from_entries(vec![
            CampusCalendarEntry::new(TUTORIAL_START, date(8, 20)),
            CampusCalendarEntry::new(TUTORIAL_END, date(6, 1)),
        ]);

        assert!(matches!(
            calendar.tutorial_range(),
            Err(CalendarError::EndPrecedesStart { .. })
        ));
    }

    #[test]
    fn half_recorded_tutorial_window_is_treated_as_unset() {
        let calendar =
            CampusCalendar::from_entries(vec![CampusCalendarEntry::new(TUTORIAL_START, date(6, 1))]);
        assert_eq!(calendar.tutorial_range().expect("no error"), None);
    }
}
