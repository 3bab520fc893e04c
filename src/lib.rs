//! Cohort Match - group distribution and pairing for laboratory animal cohorts
//!
//! This library provides the core assignment algorithms used by the Cohort Match service.
//! A cohort is either spread evenly across N named groups or paired up by sex, genotype
//! and age, and every run produces per-group summaries for display and export.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CohortError, PairMatcher, Pipeline, ProcessConfig, ProcessMode, ProcessOutcome};
pub use models::{AnimalRecord, Group, GroupSummary, MatchResult, DistributionResult, Pair, RawTable, Sex};
