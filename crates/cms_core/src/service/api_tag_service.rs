//! API tag service.
//!
//! # Responsibility
//! - CRUD for API tags.
//! - Find-or-create by name for endpoint tag resolution ([`TagResolver`]).
//!
//! # Invariants
//! - Names are trimmed before storage and lookup; matching is exact.
//! - `api_tags.name` is UNIQUE, so concurrent creators race on the insert and
//!   the loser sees `ServiceError::Conflict`.
//! - A tag still linked to an endpoint cannot be deleted (foreign key).

use crate::error::{ServiceError, ServiceResult};
use crate::model::api_tag::ApiTag;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::resolver::{Resolved, TagResolver};
use crate::repo::entity_store::{ensure_connection_ready, Entity, EntityStore, ListQuery};
use crate::service::validation::{require_id, require_text};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiTagRequest {
    pub name: String,
    #[serde(default)]
    pub creator_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateApiTagRequest {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub changed_user: Option<EntityId>,
}

pub struct ApiTagService<'conn> {
    conn: &'conn Connection,
    store: EntityStore<ApiTag>,
}

impl<'conn> ApiTagService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[ApiTag::TABLE])?;
        Ok(Self {
            conn,
            store: EntityStore::new(),
        })
    }

    /// Inserts a new tag; an existing name is a conflict.
    pub fn create_tag(&self, request: &CreateApiTagRequest) -> ServiceResult<EntityId> {
        require_text("name", &request.name)?;
        self.insert_tag(request.name.trim(), request.creator_id)
    }

    pub fn get_tag(&self, id: EntityId) -> ServiceResult<ApiTag> {
        require_id("id", id)?;
        Ok(self.store.get(self.conn, id)?)
    }

    /// Exact lookup of a trimmed name.
    pub fn find_tag_by_name(&self, name: &str) -> ServiceResult<Option<ApiTag>> {
        require_text("name", name)?;
        Ok(self.store.find_by(self.conn, "name", name.trim())?)
    }

    pub fn update_tag(&self, request: &UpdateApiTagRequest) -> ServiceResult<EntityId> {
        require_id("id", request.id)?;
        require_text("name", &request.name)?;

        let mut tag = self.store.get(self.conn, request.id)?;
        tag.name = request.name.trim().to_string();
        tag.version += 1;
        tag.changed = Some(now_epoch_ms());
        tag.changed_user = request.changed_user;
        self.store.update(self.conn, &tag)?;
        info!(
            "event=api_tag_update module=service status=ok id={} version={}",
            tag.id, tag.version
        );
        Ok(tag.id)
    }

    pub fn delete_tag(&self, id: EntityId) -> ServiceResult<bool> {
        require_id("id", id)?;
        let deleted = self.store.delete(self.conn, id)?;
        info!("event=api_tag_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    pub fn list_tags(&self, query: &ListQuery) -> ServiceResult<Vec<ApiTag>> {
        Ok(self.store.list(self.conn, query)?)
    }

    fn insert_tag(&self, name: &str, creator_id: Option<EntityId>) -> ServiceResult<EntityId> {
        let tag = ApiTag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            version: 1,
            created: now_epoch_ms(),
            creator_id,
            changed: None,
            changed_user: None,
        };
        let id = self.store.insert(self.conn, &tag)?;
        info!("event=api_tag_create module=service status=ok id={id}");
        Ok(id)
    }
}

impl TagResolver for ApiTagService<'_> {
    fn resolve_or_create(&self, name: &str) -> ServiceResult<Resolved> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("tag name must not be blank"));
        }
        if let Some(tag) = self.store.find_by(self.conn, "name", name)? {
            return Ok(Resolved {
                id: tag.id,
                created: false,
            });
        }
        let id = self.insert_tag(name, None)?;
        Ok(Resolved { id, created: true })
    }
}
