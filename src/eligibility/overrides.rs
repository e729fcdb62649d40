use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::course::{numbers, CourseId};
use crate::student::{CategoryFlag, StudentAchievementSet};

/// Sections of M 117 that students may start without prerequisites.
pub const DISTANCE_SECTIONS: [&str; 2] = ["801", "809"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideBasis {
    CategoryFlag(CategoryFlag),
    RegistrarClearance,
    DistanceSection(String),
}

impl fmt::Display for OverrideBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideBasis::CategoryFlag(flag) => write!(f, "category flag {flag}"),
            OverrideBasis::RegistrarClearance => f.write_str("registrar clearance"),
            OverrideBasis::DistanceSection(section) => write!(f, "section {section}"),
        }
    }
}

/// A recorded exception that stands in for a course's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteOverride {
    pub course: CourseId,
    pub basis: OverrideBasis,
}

/// Rules deciding when a student may skip a course's prerequisite check.
///
/// Overrides only ever replace the prerequisite stage; attempt history and
/// enrollment gates still apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePolicy {
    flag_courses: BTreeMap<CourseId, CategoryFlag>,
    registrar_clearances: bool,
    open_sections: BTreeMap<CourseId, BTreeSet<String>>,
}

impl OverridePolicy {
    /// A policy that never overrides anything.
    pub fn none() -> Self {
        Self {
            flag_courses: BTreeMap::new(),
            registrar_clearances: false,
            open_sections: BTreeMap::new(),
        }
    }

    pub fn with_flag(mut self, course: impl Into<CourseId>, flag: impl Into<CategoryFlag>) -> Self {
        self.flag_courses.insert(course.into(), flag.into());
        self
    }

    pub fn with_registrar_clearances(mut self, honoured: bool) -> Self {
        self.registrar_clearances = honoured;
        self
    }

    pub fn with_open_section(
        mut self,
        course: impl Into<CourseId>,
        section: impl Into<String>,
    ) -> Self {
        self.open_sections
            .entry(course.into())
            .or_default()
            .insert(section.into());
        self
    }

    pub fn flag_for(&self, course: &CourseId) -> Option<&CategoryFlag> {
        self.flag_courses.get(course)
    }

    /// The first applicable override for `course`: category flag, then registrar
    /// clearance, then an open section registration.
    pub fn override_for(
        &self,
        achievements: &StudentAchievementSet,
        course: &CourseId,
    ) -> Option<PrerequisiteOverride> {
        let basis = self
            .flag_basis(achievements, course)
            .or_else(|| self.clearance_basis(achievements, course))
            .or_else(|| self.section_basis(achievements, course))?;

        Some(PrerequisiteOverride {
            course: course.clone(),
            basis,
        })
    }

    fn flag_basis(
        &self,
        achievements: &StudentAchievementSet,
        course: &CourseId,
    ) -> Option<OverrideBasis> {
        self.flag_for(course)
            .filter(|flag| achievements.has_flag(flag.as_str()))
            .map(|flag| OverrideBasis::CategoryFlag(flag.clone()))
    }

    fn clearance_basis(
        &self,
        achievements: &StudentAchievementSet,
        course: &CourseId,
    ) -> Option<OverrideBasis> {
        (self.registrar_clearances && achievements.has_prerequisite_clearance(course))
            .then_some(OverrideBasis::RegistrarClearance)
    }

    fn section_basis(
        &self,
        achievements: &StudentAchievementSet,
        course: &CourseId,
    ) -> Option<OverrideBasis> {
        let sections = self.open_sections.get(course)?;
        let section = achievements.registration(course)?.section.as_ref()?;

        sections
            .contains(section)
            .then(|| OverrideBasis::DistanceSection(section.clone()))
    }
}

impl Default for OverridePolicy {
    /// `PCTxxx` flags for their courses, registrar clearances, and the M 117
    /// distance sections.
    fn default() -> Self {
        let flagged = [
            (numbers::M117, CategoryFlag::PCT117),
            (numbers::M118, CategoryFlag::PCT118),
            (numbers::M124, CategoryFlag::PCT124),
            (numbers::M125, CategoryFlag::PCT125),
            (numbers::M126, CategoryFlag::PCT126),
        ];

        let policy = flagged
            .into_iter()
            .fold(Self::none(), |policy, (course, flag)| policy.with_flag(course, flag))
            .with_registrar_clearances(true);

        DISTANCE_SECTIONS
            .into_iter()
            .fold(policy, |policy, section| {
                policy.with_open_section(numbers::M117, section)
            })
    }
}
