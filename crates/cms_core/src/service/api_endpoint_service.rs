//! API endpoint use-case service.
//!
//! # Responsibility
//! - Create/update/delete endpoints together with their tag links and their
//!   owned documentation, swagger and tour sub-resources.
//! - Read endpoints with their tags expanded.
//!
//! # Invariants
//! - Tags are requested by name; unknown names are created on the fly.
//! - `documentation` and `swagger` are attachments, `tour` is an image; each
//!   slot follows the cascade create/update/delete rules.
//! - Updates replace every scalar field (full replacement) and bump
//!   `version`.
//!
//! # See also
//! - `reconcile::orchestrator` for the write sequence.

use crate::error::ServiceResult;
use crate::model::api_endpoint::ApiEndpoint;
use crate::model::api_tag::ApiTag;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::cascade::{self, CascadeCoordinator};
use crate::reconcile::orchestrator::{Orchestrator, ParentPlan, ParentView};
use crate::reconcile::resolver::resolve_names;
use crate::repo::entity_store::{ensure_connection_ready, Entity, ListQuery};
use crate::repo::link_repo::{LinkTable, API_ENDPOINT_TAGS};
use crate::service::api_tag_service::ApiTagService;
use crate::service::attachment_service::{AttachmentPayload, AttachmentService};
use crate::service::image_service::{ImagePayload, ImageService};
use crate::service::validation::{
    filled, require_id, require_langcode, require_text, require_url_alias,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub const SLOT_DOCUMENTATION: &str = "documentation";
pub const SLOT_SWAGGER: &str = "swagger";
pub const SLOT_TOUR: &str = "tour";

/// Full endpoint state requested by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpointRequest {
    pub api_name: String,
    #[serde(default)]
    pub api_scope: Option<String>,
    #[serde(default)]
    pub api_scope_production: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub endpoint_urls: Option<String>,
    pub app_environment: EntityId,
    #[serde(default)]
    pub api_version: Option<String>,
    pub langcode: String,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub promote: bool,
    pub url_alias: String,
    #[serde(default)]
    pub published: bool,
    /// Requested tag names; the stored links become exactly this set.
    #[serde(default)]
    pub api_tags: Vec<String>,
    #[serde(default)]
    pub documentation: Option<AttachmentPayload>,
    #[serde(default)]
    pub swagger: Option<AttachmentPayload>,
    #[serde(default)]
    pub tour: Option<ImagePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateApiEndpointRequest {
    pub id: EntityId,
    #[serde(flatten)]
    pub endpoint: ApiEndpointRequest,
}

/// Endpoint with its linked tags resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpointDetail {
    pub endpoint: ApiEndpoint,
    pub api_tags: Vec<ApiTag>,
}

/// Endpoint hooks for the reconciliation orchestrator.
pub struct ApiEndpointPlan<'conn> {
    tags: ApiTagService<'conn>,
    images: ImageService<'conn>,
    attachments: AttachmentService<'conn>,
}

impl ParentPlan for ApiEndpointPlan<'_> {
    type Parent = ApiEndpoint;
    type Request = ApiEndpointRequest;

    fn links(&self) -> LinkTable {
        API_ENDPOINT_TAGS
    }

    fn validate(&self, request: &ApiEndpointRequest) -> ServiceResult<()> {
        require_text("api_name", &request.api_name)?;
        require_id("app_environment", request.app_environment)?;
        require_langcode(&request.langcode)?;
        require_url_alias(&request.url_alias)?;
        for name in &request.api_tags {
            require_text("api_tags", name)?;
        }
        Ok(())
    }

    fn preflight(
        &self,
        request: &ApiEndpointRequest,
        current: Option<&ApiEndpoint>,
    ) -> ServiceResult<()> {
        cascade::preflight(
            &self.attachments,
            current.and_then(|endpoint| endpoint.documentation),
            request.documentation.as_ref(),
        )?;
        cascade::preflight(
            &self.attachments,
            current.and_then(|endpoint| endpoint.swagger),
            request.swagger.as_ref(),
        )?;
        cascade::preflight(
            &self.images,
            current.and_then(|endpoint| endpoint.tour),
            request.tour.as_ref(),
        )
    }

    fn resolve_associations(
        &self,
        request: &ApiEndpointRequest,
    ) -> ServiceResult<BTreeSet<EntityId>> {
        resolve_names(&self.tags, &request.api_tags)
    }

    fn cascade<'a>(
        &'a self,
        request: &ApiEndpointRequest,
        current: Option<&ApiEndpoint>,
        coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()> {
        coordinator.upsert(
            SLOT_DOCUMENTATION,
            &self.attachments,
            current.and_then(|endpoint| endpoint.documentation),
            request.documentation.as_ref(),
        )?;
        coordinator.upsert(
            SLOT_SWAGGER,
            &self.attachments,
            current.and_then(|endpoint| endpoint.swagger),
            request.swagger.as_ref(),
        )?;
        coordinator.upsert(
            SLOT_TOUR,
            &self.images,
            current.and_then(|endpoint| endpoint.tour),
            request.tour.as_ref(),
        )?;
        Ok(())
    }

    fn build(
        &self,
        request: ApiEndpointRequest,
        current: Option<ApiEndpoint>,
        coordinator: &CascadeCoordinator<'_>,
    ) -> ApiEndpoint {
        let now = now_epoch_ms();
        let (id, version, created, changed) = match current {
            Some(current) => (current.id, current.version + 1, current.created, Some(now)),
            None => (Uuid::new_v4(), 1, now, None),
        };
        ApiEndpoint {
            id,
            api_name: request.api_name.trim().to_string(),
            api_scope: optional(request.api_scope),
            api_scope_production: optional(request.api_scope_production),
            deprecated: request.deprecated,
            description: optional(request.description),
            documentation: coordinator.reference(SLOT_DOCUMENTATION),
            endpoint_urls: optional(request.endpoint_urls),
            app_environment: request.app_environment,
            swagger: coordinator.reference(SLOT_SWAGGER),
            tour: coordinator.reference(SLOT_TOUR),
            api_version: optional(request.api_version),
            langcode: request.langcode,
            sticky: request.sticky,
            promote: request.promote,
            url_alias: request.url_alias,
            published: request.published,
            version,
            created,
            changed,
        }
    }

    fn release<'a>(
        &'a self,
        endpoint: &ApiEndpoint,
        coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()> {
        coordinator.release(SLOT_DOCUMENTATION, &self.attachments, endpoint.documentation)?;
        coordinator.release(SLOT_SWAGGER, &self.attachments, endpoint.swagger)?;
        coordinator.release(SLOT_TOUR, &self.images, endpoint.tour)
    }
}

fn optional(value: Option<String>) -> Option<String> {
    filled(value.as_deref()).map(str::to_string)
}

/// Endpoint facade over the reconciliation orchestrator.
pub struct ApiEndpointService<'conn> {
    orchestrator: Orchestrator<'conn, ApiEndpointPlan<'conn>>,
}

impl<'conn> ApiEndpointService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[ApiEndpoint::TABLE, API_ENDPOINT_TAGS.table])?;
        let plan = ApiEndpointPlan {
            tags: ApiTagService::try_new(conn)?,
            images: ImageService::try_new(conn)?,
            attachments: AttachmentService::try_new(conn)?,
        };
        Ok(Self {
            orchestrator: Orchestrator::new(conn, plan),
        })
    }

    pub fn create_endpoint(&self, request: ApiEndpointRequest) -> ServiceResult<EntityId> {
        self.orchestrator.create(request)
    }

    pub fn update_endpoint(&self, request: UpdateApiEndpointRequest) -> ServiceResult<EntityId> {
        self.orchestrator.update(request.id, request.endpoint)
    }

    pub fn delete_endpoint(&self, id: EntityId) -> ServiceResult<bool> {
        self.orchestrator.delete(id)
    }

    pub fn get_endpoint(&self, id: EntityId) -> ServiceResult<ApiEndpointDetail> {
        let view = self.orchestrator.get(id)?;
        self.expand(view)
    }

    pub fn list_endpoints(&self, query: &ListQuery) -> ServiceResult<Vec<ApiEndpointDetail>> {
        self.orchestrator
            .list(query)?
            .into_iter()
            .map(|view| self.expand(view))
            .collect()
    }

    fn expand(&self, view: ParentView<ApiEndpoint>) -> ServiceResult<ApiEndpointDetail> {
        let tags = &self.orchestrator.plan().tags;
        let mut api_tags = view
            .associations
            .iter()
            .map(|id| tags.get_tag(*id))
            .collect::<ServiceResult<Vec<_>>>()?;
        api_tags.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(ApiEndpointDetail {
            endpoint: view.parent,
            api_tags,
        })
    }
}
