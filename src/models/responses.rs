use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::core::pipeline::ProcessOutcome;

/// Response for the process/distribute/pair endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ProcessOutcome,
}

/// Parsed upload: raw rows keyed by normalized header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub animals: Vec<BTreeMap<String, String>>,
    pub genotypes: Vec<String>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
