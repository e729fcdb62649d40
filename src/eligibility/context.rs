use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{EngineFamily, OverridePolicy, SubjectId};
use crate::calendar::{CalendarError, CalendarWindow, CampusCalendar, DateRange, DateRangeGroup};
use crate::prereq::PrerequisiteCatalog;
use crate::term::TermKey;

/// How the access window of an exam or tutorial is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSchedule {
    AlwaysOpen,
    Between(DateRange),
    OutsideBlackouts(CalendarWindow),
    Closed,
}

impl AccessSchedule {
    pub fn availability(&self, today: NaiveDate) -> DateRangeGroup {
        match self {
            AccessSchedule::AlwaysOpen => DateRangeGroup::classify(vec![DateRange::forever()], today),
            AccessSchedule::Between(range) => DateRangeGroup::classify(vec![*range], today),
            AccessSchedule::OutsideBlackouts(window) => window.partition(today, today),
            AccessSchedule::Closed => DateRangeGroup::default(),
        }
    }
}

/// Access schedules per subject, with a fallback per engine family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessCalendar {
    subjects: BTreeMap<SubjectId, AccessSchedule>,
    families: BTreeMap<EngineFamily, AccessSchedule>,
}

impl AccessCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<SubjectId>, schedule: AccessSchedule) -> Self {
        self.subjects.insert(subject.into(), schedule);
        self
    }

    pub fn with_family(mut self, family: EngineFamily, schedule: AccessSchedule) -> Self {
        self.families.insert(family, schedule);
        self
    }

    /// Schedules derived from the campus calendar: maintenance blackouts for the
    /// online exams and the ELM tutorial, and the `tut_start`/`tut_end` range for
    /// the precalculus tutorials.
    pub fn from_campus_calendar(calendar: &CampusCalendar) -> Result<Self, CalendarError> {
        let maintenance = calendar.maintenance_window();
        let tutorial = match calendar.tutorial_range()? {
            Some(range) => AccessSchedule::Between(range),
            None => AccessSchedule::Closed,
        };

        Ok(Self::new()
            .with_family(
                EngineFamily::ChallengeExam,
                AccessSchedule::OutsideBlackouts(maintenance.clone()),
            )
            .with_family(EngineFamily::PrecalcTutorial, tutorial)
            .with_family(
                EngineFamily::RemedialTutorial,
                AccessSchedule::OutsideBlackouts(maintenance),
            ))
    }

    /// Subject schedule first, then the family schedule.
    pub fn schedule_for(&self, family: EngineFamily, subject: &SubjectId) -> Option<&AccessSchedule> {
        self.subjects
            .get(subject)
            .or_else(|| self.families.get(&family))
    }

    /// Open ranges for `subject` relative to `today`; nothing is open when no
    /// schedule is configured.
    pub fn availability(
        &self,
        family: EngineFamily,
        subject: &SubjectId,
        today: NaiveDate,
    ) -> DateRangeGroup {
        match self.schedule_for(family, subject) {
            Some(schedule) => schedule.availability(today),
            None => {
                warn!(%family, %subject, "no access schedule configured; treating as closed");
                DateRangeGroup::default()
            }
        }
    }

    /// Family-wide availability, ignoring subject schedules.
    pub fn family_availability(&self, family: EngineFamily, today: NaiveDate) -> DateRangeGroup {
        match self.families.get(&family) {
            Some(schedule) => schedule.availability(today),
            None => {
                warn!(%family, "no access schedule configured; treating as closed");
                DateRangeGroup::default()
            }
        }
    }
}

/// Shared, read-only inputs every engine is built from.
#[derive(Debug, Clone)]
pub struct EligibilityContext {
    pub catalog: Arc<PrerequisiteCatalog>,
    pub calendars: Arc<AccessCalendar>,
    pub active_term: TermKey,
    pub overrides: OverridePolicy,
}

impl EligibilityContext {
    pub fn new(
        catalog: Arc<PrerequisiteCatalog>,
        calendars: Arc<AccessCalendar>,
        active_term: TermKey,
    ) -> Self {
        Self {
            catalog,
            calendars,
            active_term,
            overrides: OverridePolicy::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: OverridePolicy) -> Self {
        self.overrides = overrides;
        self
    }
}
