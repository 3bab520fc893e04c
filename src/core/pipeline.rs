use crate::core::{
    distributor::distribute,
    error::CohortError,
    matcher::PairMatcher,
    normalizer::{normalize, DedupKey, NormalizeOptions},
    splitter::{split_into_groups, validate_group_names},
    summary::{overview, summarize_groups},
};
use crate::models::{
    AnimalRecord, CohortOverview, DistributionResult, Group, GroupSummary, MatchResult, Pair, RawTable,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Which grouping strategy to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    /// Distribution for exactly one selected genotype, pairing otherwise
    #[default]
    Auto,
    Distribute,
    Pair,
}

/// Caller-supplied settings for one processing run
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub group_names: Vec<String>,
    pub age_leeway_weeks: u32,
    pub selected_genotypes: Vec<String>,
    pub mode: ProcessMode,
}

impl ProcessConfig {
    fn validate(&self) -> Result<(), CohortError> {
        if self.selected_genotypes.iter().all(|g| g.trim().is_empty()) {
            return Err(CohortError::NoGenotypesSelected);
        }
        validate_group_names(&self.group_names)
    }

    fn genotype_set(&self) -> BTreeSet<String> {
        self.selected_genotypes
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn resolved_mode(&self) -> ProcessMode {
        match self.mode {
            ProcessMode::Auto if self.genotype_set().len() == 1 => ProcessMode::Distribute,
            ProcessMode::Auto => ProcessMode::Pair,
            other => other,
        }
    }
}

/// State owned by a single processing request
///
/// Created at the start of [`Pipeline::run`] and dropped when it returns,
/// so nothing leaks from one request into the next.
#[derive(Debug)]
pub struct ProcessingContext {
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub config: ProcessConfig,
}

impl ProcessingContext {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
        }
    }
}

/// Pairs, unpaired animals and the groups the pairs were split into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingOutcome {
    #[serde(rename = "match")]
    pub result: MatchResult,
    pub groups: Vec<Group<Pair>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Assignment {
    Distribution(DistributionResult),
    Pairing(PairingOutcome),
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    #[serde(rename = "requestId")]
    pub request_id: Uuid,
    pub assignment: Assignment,
    pub summaries: Vec<GroupSummary>,
    pub overview: CohortOverview,
}

impl ProcessOutcome {
    pub fn group_names(&self) -> Vec<&str> {
        match &self.assignment {
            Assignment::Distribution(d) => d.groups.iter().map(|g| g.name.as_str()).collect(),
            Assignment::Pairing(p) => p.groups.iter().map(|g| g.name.as_str()).collect(),
        }
    }

    pub fn unpaired(&self) -> &[AnimalRecord] {
        match &self.assignment {
            Assignment::Distribution(_) => &[],
            Assignment::Pairing(p) => &p.result.unpaired,
        }
    }
}

/// Runs normalizer → distributor or matcher → splitter → summaries
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Process one uploaded table. Failures return no partial result.
    pub fn run(&self, table: &RawTable, config: ProcessConfig) -> Result<ProcessOutcome, CohortError> {
        config.validate()?;
        let context = ProcessingContext::new(config);
        let span = tracing::info_span!("process", request_id = %context.request_id);
        let _guard = span.enter();

        let result = Self::run_in_context(table, &context);
        match &result {
            Ok(outcome) => tracing::info!(
                groups = outcome.summaries.len(),
                animals = outcome.overview.total_animals,
                elapsed_ms = (Utc::now() - context.started_at).num_milliseconds(),
                "Processing completed"
            ),
            Err(e) if e.is_user_error() => tracing::warn!("Processing rejected: {}", e),
            Err(e) => tracing::error!("Processing failed: {}", e),
        }
        result
    }

    fn run_in_context(table: &RawTable, context: &ProcessingContext) -> Result<ProcessOutcome, CohortError> {
        let config = &context.config;
        let genotypes = config.genotype_set();
        let mode = config.resolved_mode();

        let dedup = match mode {
            ProcessMode::Pair => DedupKey::IdAndSex,
            _ => DedupKey::Id,
        };
        let options = NormalizeOptions::new(dedup).with_genotypes(genotypes.iter().cloned());
        let records = normalize(table, &options)?;
        if records.is_empty() {
            return Err(CohortError::NoMatchCriteria);
        }

        tracing::info!(
            records = records.len(),
            genotypes = ?genotypes,
            mode = ?mode,
            "Normalized cohort"
        );

        let (assignment, summaries) = match mode {
            ProcessMode::Pair => {
                let matcher = PairMatcher::for_selection(config.age_leeway_weeks, genotypes.len());
                let result = matcher.match_records(&records);
                let groups = split_into_groups(&result.pairs, &config.group_names)?;
                let summaries = summarize_groups(&groups);
                (Assignment::Pairing(PairingOutcome { result, groups }), summaries)
            }
            _ => {
                let result = distribute(&records, &config.group_names)?;
                let summaries = summarize_groups(&result.groups);
                (Assignment::Distribution(result), summaries)
            }
        };

        Ok(ProcessOutcome {
            request_id: context.request_id,
            assignment,
            summaries,
            overview: overview(&records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        let rows = [
            ["A", "Male", "WT", "10"],
            ["B", "Male", "WT", "11"],
            ["C", "Female", "WT", "10"],
            ["D", "Female", "KO", "9"],
            ["E", "Female", "HET", "20"],
        ];
        RawTable::new(
            &["Animal ID", "Sex", "Genotype", "Age (w)"],
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        )
    }

    fn config(genotypes: &[&str], groups: &[&str]) -> ProcessConfig {
        ProcessConfig {
            group_names: groups.iter().map(|g| g.to_string()).collect(),
            age_leeway_weeks: 2,
            selected_genotypes: genotypes.iter().map(|g| g.to_string()).collect(),
            mode: ProcessMode::Auto,
        }
    }

    #[test]
    fn test_single_genotype_distributes() {
        let outcome = Pipeline::new().run(&table(), config(&["WT"], &["G1", "G2"])).unwrap();
        match &outcome.assignment {
            Assignment::Distribution(d) => assert_eq!(d.counts.total, 3),
            other => panic!("expected distribution, got {:?}", other),
        }
        assert_eq!(outcome.summaries.iter().map(|s| s.total).sum::<usize>(), 3);
        assert!(outcome.unpaired().is_empty());
    }

    #[test]
    fn test_multiple_genotypes_pair() {
        let outcome = Pipeline::new().run(&table(), config(&["WT", "KO"], &["G1", "G2"])).unwrap();
        let Assignment::Pairing(pairing) = &outcome.assignment else {
            panic!("expected pairing");
        };
        assert_eq!(pairing.result.counts.pair_count, 2);
        assert!(pairing.result.unpaired.is_empty());
        assert_eq!(outcome.group_names(), vec!["G1", "G2"]);
        assert_eq!(outcome.summaries[0].total, 2);
    }

    #[test]
    fn test_no_matching_genotype() {
        let err = Pipeline::new().run(&table(), config(&["NOPE"], &["G1"])).unwrap_err();
        assert_eq!(err, CohortError::NoMatchCriteria);
    }

    #[test]
    fn test_config_errors_come_first() {
        let err = Pipeline::new().run(&table(), config(&[], &["G1"])).unwrap_err();
        assert_eq!(err, CohortError::NoGenotypesSelected);

        let err = Pipeline::new().run(&table(), config(&["WT"], &[])).unwrap_err();
        assert_eq!(err, CohortError::NoGroups);
    }

    #[test]
    fn test_forced_pair_mode_with_one_genotype() {
        let mut cfg = config(&["WT"], &["G1"]);
        cfg.mode = ProcessMode::Pair;
        let outcome = Pipeline::new().run(&table(), cfg).unwrap();
        let Assignment::Pairing(pairing) = &outcome.assignment else {
            panic!("expected pairing");
        };
        assert_eq!(pairing.result.counts.pair_count, 1);
        assert_eq!(pairing.result.unpaired[0].id, "C");
    }

    #[test]
    fn test_runs_are_independent_and_deterministic() {
        let pipeline = Pipeline::new();
        let a = pipeline.run(&table(), config(&["WT", "KO", "HET"], &["X", "Y"])).unwrap();
        let b = pipeline.run(&table(), config(&["WT", "KO", "HET"], &["X", "Y"])).unwrap();
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.summaries, b.summaries);
    }
}
