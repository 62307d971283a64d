//! Content catalog core.
//!
//! Owns the catalog records (API endpoints, FAQs and their tags, categories,
//! images and attachments) and the transactional write path that keeps a
//! parent record, its association links and its owned sub-resources
//! consistent.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use api::command::{execute, Command};
pub use api::envelope::{safe_execute, ExceptionBody, Response};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use error::{ServiceError, ServiceResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::EntityId;
pub use reconcile::orchestrator::{ParentView, ReconcileStage};
pub use repo::entity_store::{ListQuery, RepoError, RepoResult};
pub use service::api_endpoint_service::{
    ApiEndpointDetail, ApiEndpointRequest, ApiEndpointService, UpdateApiEndpointRequest,
};
pub use service::api_tag_service::ApiTagService;
pub use service::attachment_service::{AttachmentPayload, AttachmentService};
pub use service::faq_category_service::FaqCategoryService;
pub use service::faq_service::{FaqRequest, FaqService, FaqView, UpdateFaqRequest};
pub use service::image_service::{ImagePayload, ImageService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
