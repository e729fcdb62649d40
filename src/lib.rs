//! Eligibility and prerequisite rules for the mathematics program: challenge exams,
//! the precalculus tutorial sequence and the ELM remedial tutorial.

pub mod calendar;
pub mod config;
pub mod course;
pub mod eligibility;
pub mod error;
pub mod prereq;
pub mod student;
pub mod telemetry;
pub mod term;
