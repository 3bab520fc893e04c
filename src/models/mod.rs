// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod table;

pub use domain::{
    AnimalRecord, CohortOverview, DistributionCounts, DistributionResult, Group, GroupMember, GroupSummary,
    MatchCounts, MatchResult, Pair, Sex, SexCounts,
};
pub use requests::{AnimalInput, CellValue, ProcessRequest};
pub use responses::{ErrorResponse, HealthResponse, ProcessResponse, UploadResponse};
pub use table::{normalize_header, Column, RawTable};
