// Core algorithm exports
pub mod distributor;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod splitter;
pub mod summary;

pub use distributor::distribute;
pub use error::CohortError;
pub use matcher::PairMatcher;
pub use normalizer::{normalize, DedupKey, NormalizeOptions};
pub use pipeline::{Assignment, PairingOutcome, Pipeline, ProcessConfig, ProcessMode, ProcessOutcome, ProcessingContext};
pub use splitter::{round_robin, split_into_groups, validate_group_names};
pub use summary::{overview, summarize_groups};
