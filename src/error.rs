use crate::calendar::{CalendarError, CampusCalendarError};
use crate::config::ConfigError;
use crate::prereq::CatalogError;
use crate::telemetry::TelemetryError;
use crate::term::TermError;
use std::fmt;

/// Failures a host can hit while wiring the engines together. Per-student
/// unavailability is never an error; it is reported as a decision.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Catalog(CatalogError),
    Calendar(CalendarError),
    CampusCalendar(CampusCalendarError),
    Term(TermError),
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Catalog(err) => write!(f, "prerequisite catalog error: {}", err),
            AppError::Calendar(err) => write!(f, "calendar error: {}", err),
            AppError::CampusCalendar(err) => write!(f, "campus calendar error: {}", err),
            AppError::Term(err) => write!(f, "term error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Calendar(err) => Some(err),
            AppError::CampusCalendar(err) => Some(err),
            AppError::Term(err) => Some(err),
            AppError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<CalendarError> for AppError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

impl From<CampusCalendarError> for AppError {
    fn from(value: CampusCalendarError) -> Self {
        Self::CampusCalendar(value)
    }
}

impl From<TermError> for AppError {
    fn from(value: TermError) -> Self {
        Self::Term(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
