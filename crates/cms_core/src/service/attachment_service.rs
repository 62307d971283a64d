//! Attachment sub-resource service.
//!
//! Same lifecycle rules as images: full create, partial update with a
//! version bump, hard delete.

use crate::error::{ServiceError, ServiceResult};
use crate::model::attachment::Attachment;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::cascade::{SubResourcePayload, SubResourceService};
use crate::repo::entity_store::{ensure_connection_ready, Entity, EntityStore, ListQuery};
use crate::service::validation::{filled, require_id, require_some_text};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment content accepted on create and partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Raw file body.
    #[serde(default)]
    pub file_url: Option<Vec<u8>>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub actor_id: Option<EntityId>,
}

impl AttachmentPayload {
    fn body(&self) -> Option<&[u8]> {
        self.file_url.as_deref().filter(|body| !body.is_empty())
    }
}

impl SubResourcePayload for AttachmentPayload {
    fn is_empty(&self) -> bool {
        filled(self.file_name.as_deref()).is_none()
            && filled(self.file_path.as_deref()).is_none()
            && self.body().is_none()
    }

    fn validate_for_create(&self) -> ServiceResult<()> {
        require_some_text("file_name", self.file_name.as_deref())?;
        require_some_text("file_path", self.file_path.as_deref())?;
        if self.body().is_none() {
            return Err(ServiceError::validation("`file_url` is required"));
        }
        Ok(())
    }
}

pub struct AttachmentService<'conn> {
    conn: &'conn Connection,
    store: EntityStore<Attachment>,
}

impl<'conn> AttachmentService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[Attachment::TABLE])?;
        Ok(Self {
            conn,
            store: EntityStore::new(),
        })
    }

    pub fn create_attachment(&self, payload: &AttachmentPayload) -> ServiceResult<EntityId> {
        payload.validate_for_create()?;
        let body = payload.body().unwrap_or_default();

        let attachment = Attachment {
            id: Uuid::new_v4(),
            file_name: payload.file_name.clone().unwrap_or_default(),
            file_url: body.to_vec(),
            file_path: payload.file_path.clone().unwrap_or_default(),
            version: 1,
            created: now_epoch_ms(),
            changed: None,
            changed_user: payload.actor_id,
        };
        let id = self.store.insert(self.conn, &attachment)?;
        info!(
            "event=attachment_create module=service status=ok id={id} bytes={}",
            attachment.file_url.len()
        );
        Ok(id)
    }

    pub fn get_attachment(&self, id: EntityId) -> ServiceResult<Attachment> {
        require_id("id", id)?;
        Ok(self.store.get(self.conn, id)?)
    }

    pub fn update_attachment(
        &self,
        id: EntityId,
        payload: &AttachmentPayload,
    ) -> ServiceResult<EntityId> {
        require_id("id", id)?;
        if payload.is_empty() {
            return Err(ServiceError::validation(
                "attachment update carries no fields",
            ));
        }

        let mut attachment = self.store.get(self.conn, id)?;
        if let Some(value) = filled(payload.file_name.as_deref()) {
            attachment.file_name = value.to_string();
        }
        if let Some(value) = filled(payload.file_path.as_deref()) {
            attachment.file_path = value.to_string();
        }
        if let Some(body) = payload.body() {
            attachment.file_url = body.to_vec();
        }
        attachment.version += 1;
        attachment.changed = Some(now_epoch_ms());
        attachment.changed_user = payload.actor_id;

        self.store.update(self.conn, &attachment)?;
        info!(
            "event=attachment_update module=service status=ok id={id} version={}",
            attachment.version
        );
        Ok(id)
    }

    pub fn delete_attachment(&self, id: EntityId) -> ServiceResult<bool> {
        require_id("id", id)?;
        let deleted = self.store.delete(self.conn, id)?;
        info!("event=attachment_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    pub fn list_attachments(&self, query: &ListQuery) -> ServiceResult<Vec<Attachment>> {
        Ok(self.store.list(self.conn, query)?)
    }
}

impl SubResourceService for AttachmentService<'_> {
    type Resource = Attachment;
    type Payload = AttachmentPayload;

    const KIND: &'static str = Attachment::KIND;

    fn create(&self, payload: &AttachmentPayload) -> ServiceResult<EntityId> {
        self.create_attachment(payload)
    }

    fn get(&self, id: EntityId) -> ServiceResult<Attachment> {
        self.get_attachment(id)
    }

    fn update(&self, id: EntityId, payload: &AttachmentPayload) -> ServiceResult<EntityId> {
        self.update_attachment(id, payload)
    }

    fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.delete_attachment(id)
    }
}
