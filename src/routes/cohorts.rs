use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use thiserror::Error;
use validator::Validate;
use crate::config::ProcessingSettings;
use crate::core::{CohortError, Pipeline, ProcessConfig, ProcessMode, ProcessOutcome};
use crate::models::{ErrorResponse, HealthResponse, ProcessRequest, ProcessResponse, RawTable, UploadResponse};
use crate::services::{
    available_genotypes, groups_csv, load_csv_file, parse_csv, rows_as_maps, summary_csv, table_from_animals,
    unpaired_csv, ExportError, IngestError,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub processing: Arc<ProcessingSettings>,
    pub pipeline: Pipeline,
}

/// Failures surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Cohort(#[from] CohortError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Cohort(e) => e.kind(),
            ApiError::Ingest(e) => e.kind(),
            ApiError::Export(_) => "export_error",
            ApiError::Validation(_) => "validation_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let user_error = match self {
            ApiError::Cohort(e) => e.is_user_error(),
            ApiError::Ingest(e) => e.is_user_error(),
            ApiError::Export(_) => false,
            ApiError::Validation(_) => true,
        };
        if user_error {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::info!("Request rejected ({}): {}", self.kind(), self);
        }
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Configure all cohort routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/upload", web::post().to(upload))
        .route("/process", web::post().to(process))
        .route("/distribute", web::post().to(distribute))
        .route("/pair", web::post().to(pair))
        .route("/export/groups", web::post().to(export_groups))
        .route("/export/summary", web::post().to(export_summary))
        .route("/export/unpaired", web::post().to(export_unpaired));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Upload a CSV sheet and get back its rows and genotypes
///
/// POST /api/v1/upload (body: CSV text)
async fn upload(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let table = parse_csv(&body, state.processing.max_upload_bytes)?;
    let genotypes = available_genotypes(&table);

    tracing::info!("Detected genotypes: {:?}", genotypes);

    Ok(HttpResponse::Ok().json(UploadResponse {
        animals: rows_as_maps(&table),
        genotypes,
        total: table.len(),
    }))
}

/// Process a cohort with the mode given in the request (auto by default)
///
/// POST /api/v1/process
///
/// Request body:
/// ```json
/// {
///   "animals": [{"animalId": "A1", "sex": "Male", "genotype": "WT", "age": 10}],
///   "numGroups": 2,
///   "groupNames": ["Control", "Treated"],
///   "ageLeeway": 2,
///   "selectedGenotypes": ["WT", "KO"]
/// }
/// ```
async fn process(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, req.mode)?;
    Ok(HttpResponse::Ok().json(ProcessResponse { success: true, outcome }))
}

/// POST /api/v1/distribute
async fn distribute(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, ProcessMode::Distribute)?;
    Ok(HttpResponse::Ok().json(ProcessResponse { success: true, outcome }))
}

/// POST /api/v1/pair
async fn pair(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, ProcessMode::Pair)?;
    Ok(HttpResponse::Ok().json(ProcessResponse { success: true, outcome }))
}

async fn export_groups(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, req.mode)?;
    Ok(csv_attachment("cohort_groups.csv", groups_csv(&outcome)?))
}

async fn export_summary(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, req.mode)?;
    Ok(csv_attachment("cohort_summary.csv", summary_csv(&outcome.summaries)?))
}

async fn export_unpaired(state: web::Data<AppState>, req: web::Json<ProcessRequest>) -> Result<HttpResponse, ApiError> {
    let outcome = run_request(&state, &req, req.mode)?;
    Ok(csv_attachment("unpaired_animals.csv", unpaired_csv(outcome.unpaired())?))
}

fn csv_attachment(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", format!("attachment; filename={}", filename)))
        .body(body)
}

fn run_request(state: &AppState, req: &ProcessRequest, mode: ProcessMode) -> Result<ProcessOutcome, ApiError> {
    if let Err(errors) = req.validate() {
        return Err(ApiError::Validation(errors.to_string()));
    }

    let table = resolve_table(req, &state.processing)?;
    let config = build_config(req, &table, &state.processing, mode)?;

    tracing::info!(
        rows = table.len(),
        groups = config.group_names.len(),
        leeway_weeks = config.age_leeway_weeks,
        mode = ?mode,
        "Processing request"
    );

    Ok(state.pipeline.run(&table, config)?)
}

/// Inline CSV wins, then JSON animals; otherwise the bundled example sheet
fn resolve_table(req: &ProcessRequest, processing: &ProcessingSettings) -> Result<RawTable, IngestError> {
    if let Some(csv) = &req.csv {
        return parse_csv(csv.as_bytes(), processing.max_upload_bytes);
    }
    if req.use_example || req.animals.is_empty() {
        tracing::debug!("Using example dataset at {}", processing.example_data_path.display());
        return load_csv_file(&processing.example_data_path, processing.max_upload_bytes);
    }
    Ok(table_from_animals(&req.animals))
}

fn build_config(
    req: &ProcessRequest,
    table: &RawTable,
    processing: &ProcessingSettings,
    mode: ProcessMode,
) -> Result<ProcessConfig, ApiError> {
    let group_names: Vec<String> = match (&req.group_names, req.num_groups) {
        (Some(names), Some(expected)) if names.len() != expected => {
            return Err(CohortError::GroupCountMismatch {
                expected,
                actual: names.len(),
            }
            .into());
        }
        (Some(names), _) => names.iter().map(|n| n.trim().to_string()).collect(),
        (None, Some(count)) => (1..=count).map(|i| format!("Group {}", i)).collect(),
        (None, None) => return Err(CohortError::NoGroups.into()),
    };
    if group_names.len() > processing.max_groups {
        return Err(ApiError::Validation(format!(
            "At most {} groups are allowed, got {}",
            processing.max_groups,
            group_names.len()
        )));
    }

    let selected_genotypes = match (&req.selected_genotypes, &req.genotype_filter) {
        (Some(selected), _) => selected.clone(),
        (None, Some(filter)) => vec![filter.clone()],
        (None, None) => available_genotypes(table),
    };

    Ok(ProcessConfig {
        group_names,
        age_leeway_weeks: req.age_leeway.unwrap_or(processing.default_age_leeway_weeks),
        selected_genotypes,
        mode,
    })
}
