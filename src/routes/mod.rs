// Route exports
pub mod cohorts;

use actix_web::web;

pub use cohorts::{ApiError, AppState};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(cohorts::configure),
    );
}
