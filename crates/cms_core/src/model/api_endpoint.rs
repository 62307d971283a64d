//! API endpoint catalog entry.
//!
//! # Invariants
//! - `documentation`, `swagger` and `tour` reference owned sub-resources by
//!   value; the core keeps them consistent, not the schema.
//! - Tag associations live in `api_endpoint_tags`, never on this record.

use super::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub id: EntityId,
    pub api_name: String,
    pub api_scope: Option<String>,
    pub api_scope_production: Option<String>,
    pub deprecated: bool,
    pub description: Option<String>,
    /// Attachment holding rendered documentation.
    pub documentation: Option<EntityId>,
    pub endpoint_urls: Option<String>,
    pub app_environment: EntityId,
    /// Attachment holding the OpenAPI document.
    pub swagger: Option<EntityId>,
    /// Image used by the guided tour.
    pub tour: Option<EntityId>,
    pub api_version: Option<String>,
    pub langcode: String,
    pub sticky: bool,
    pub promote: bool,
    pub url_alias: String,
    pub published: bool,
    pub version: i64,
    pub created: i64,
    pub changed: Option<i64>,
}
