use thiserror::Error;

/// Errors raised by the normalizer, the grouping stages and the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CohortError {
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Row {row}: '{column}' is empty")]
    MissingValue { row: usize, column: String },

    #[error("Animal {id}: could not parse {column} date '{value}'")]
    DateParse {
        id: String,
        column: String,
        value: String,
    },

    #[error("Animal {id}: invalid age '{value}'")]
    InvalidAge { id: String, value: String },

    #[error("Number of groups cannot be zero")]
    NoGroups,

    #[error("Group name at position {index} is blank")]
    EmptyGroupNames { index: usize },

    #[error("Group name '{name}' is used more than once")]
    DuplicateGroupName { name: String },

    #[error("Expected {expected} group names, got {actual}")]
    GroupCountMismatch { expected: usize, actual: usize },

    #[error("At least one genotype must be selected")]
    NoGenotypesSelected,

    #[error("No animals match the criteria")]
    NoMatchCriteria,

    #[error("Internal processing error: {0}")]
    Internal(String),
}

impl CohortError {
    /// Stable identifier reported to API clients
    pub fn kind(&self) -> &'static str {
        match self {
            CohortError::Schema { .. } => "schema_error",
            CohortError::MissingValue { .. } => "missing_value",
            CohortError::DateParse { .. } => "date_parse_error",
            CohortError::InvalidAge { .. } => "invalid_age_error",
            CohortError::NoGroups => "no_groups_error",
            CohortError::EmptyGroupNames { .. } => "empty_group_names_error",
            CohortError::DuplicateGroupName { .. } => "duplicate_group_name",
            CohortError::GroupCountMismatch { .. } => "group_count_mismatch",
            CohortError::NoGenotypesSelected => "no_genotypes_selected",
            CohortError::NoMatchCriteria => "no_match_criteria_error",
            CohortError::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure was caused by the caller's data or configuration
    pub fn is_user_error(&self) -> bool {
        !matches!(self, CohortError::Internal(_))
    }
}
