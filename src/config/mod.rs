use std::env;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

use crate::calendar::CampusCalendar;
use crate::eligibility::AccessCalendar;
use crate::error::AppError;
use crate::term::{TermError, TermKey};

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for hosts embedding the eligibility engines.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub eligibility: EligibilityConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let active_term = match env::var("ELIGIBILITY_ACTIVE_TERM") {
            Ok(value) if !value.trim().is_empty() => Some(
                TermKey::parse_short(value.trim())
                    .map_err(|source| ConfigError::InvalidActiveTerm { value, source })?,
            ),
            _ => None,
        };

        let campus_calendar = env::var("ELIGIBILITY_CAMPUS_CALENDAR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            eligibility: EligibilityConfig {
                active_term,
                campus_calendar,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Inputs shared by every engine instance.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Term the registrar currently considers active, as a short code (`SM25`).
    pub active_term: Option<TermKey>,
    /// Campus calendar CSV export with `dt_desc,campus_dt` columns.
    pub campus_calendar: Option<PathBuf>,
}

impl EligibilityConfig {
    pub fn require_active_term(&self) -> Result<TermKey, ConfigError> {
        self.active_term.ok_or(ConfigError::MissingActiveTerm)
    }

    /// Access windows derived from the configured campus calendar export. Without
    /// one, every family is closed.
    pub fn access_calendar(&self) -> Result<AccessCalendar, AppError> {
        let Some(path) = &self.campus_calendar else {
            tracing::warn!("no campus calendar configured; all access windows closed");
            return Ok(AccessCalendar::new());
        };
        let campus = CampusCalendar::from_csv_reader(File::open(path)?)?;
        if let Err(error) = campus.maintenance_window().validate() {
            tracing::warn!(
                path = %path.display(),
                %error,
                "campus maintenance blackouts are malformed; open ranges will be narrowed"
            );
        }
        tracing::info!(
            path = %path.display(),
            entries = campus.entries().len(),
            "campus calendar access windows configured"
        );
        Ok(AccessCalendar::from_campus_calendar(&campus)?)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidActiveTerm { value: String, source: TermError },
    MissingActiveTerm,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidActiveTerm { value, .. } => write!(
                f,
                "ELIGIBILITY_ACTIVE_TERM '{value}' must be a short term code such as FA25"
            ),
            ConfigError::MissingActiveTerm => write!(f, "ELIGIBILITY_ACTIVE_TERM is not set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidActiveTerm { source, .. } => Some(source),
            ConfigError::MissingActiveTerm => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Season;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ELIGIBILITY_ACTIVE_TERM");
        env::remove_var("ELIGIBILITY_CAMPUS_CALENDAR");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.eligibility.active_term.is_none());
        assert!(config.eligibility.campus_calendar.is_none());
        assert!(matches!(
            config.eligibility.require_active_term(),
            Err(ConfigError::MissingActiveTerm)
        ));
    }

    #[test]
    fn reads_active_term_and_calendar_path() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("ELIGIBILITY_ACTIVE_TERM", " SM25 ");
        env::set_var("ELIGIBILITY_CAMPUS_CALENDAR", "/srv/mathops/campus_calendar.csv");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(
            config.eligibility.require_active_term().expect("term set"),
            TermKey::new(Season::Summer, 2025)
        );
        assert_eq!(
            config.eligibility.campus_calendar,
            Some(PathBuf::from("/srv/mathops/campus_calendar.csv"))
        );
    }

    #[test]
    fn rejects_malformed_active_term() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ELIGIBILITY_ACTIVE_TERM", "Summer 2025");
        let error = AppConfig::load().expect_err("malformed term rejected");
        reset_env();

        match error {
            ConfigError::InvalidActiveTerm { value, .. } => assert_eq!(value, "Summer 2025"),
            other => panic!("expected invalid active term, got {other:?}"),
        }
    }
}
