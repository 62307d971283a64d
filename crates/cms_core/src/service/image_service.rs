//! Image sub-resource service.
//!
//! # Responsibility
//! - CRUD for images owned by parent reference slots.
//! - Implement [`SubResourceService`] so parents can cascade image payloads.
//!
//! # Invariants
//! - Create requires `file_name`, `image_data` and `image_path`.
//! - Update is partial: blank payload fields keep the stored value, and every
//!   update bumps `version` and stamps `changed`/`changed_user`.

use crate::error::{ServiceError, ServiceResult};
use crate::model::image::Image;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::cascade::{SubResourcePayload, SubResourceService};
use crate::repo::entity_store::{ensure_connection_ready, Entity, EntityStore, ListQuery};
use crate::service::validation::{filled, require_id, require_some_text};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image content accepted on create and partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    /// User performing the write; stored as creator or `changed_user`.
    #[serde(default)]
    pub actor_id: Option<EntityId>,
}

impl SubResourcePayload for ImagePayload {
    fn is_empty(&self) -> bool {
        [
            &self.file_name,
            &self.image_data,
            &self.image_path,
            &self.alt_text,
        ]
        .iter()
        .all(|field| filled(field.as_deref()).is_none())
    }

    fn validate_for_create(&self) -> ServiceResult<()> {
        require_some_text("file_name", self.file_name.as_deref())?;
        require_some_text("image_data", self.image_data.as_deref())?;
        require_some_text("image_path", self.image_path.as_deref())
    }
}

pub struct ImageService<'conn> {
    conn: &'conn Connection,
    store: EntityStore<Image>,
}

impl<'conn> ImageService<'conn> {
    /// Creates a service after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[Image::TABLE])?;
        Ok(Self {
            conn,
            store: EntityStore::new(),
        })
    }

    pub fn create_image(&self, payload: &ImagePayload) -> ServiceResult<EntityId> {
        payload.validate_for_create()?;

        let image = Image {
            id: Uuid::new_v4(),
            file_name: payload.file_name.clone().unwrap_or_default(),
            image_data: payload.image_data.clone().unwrap_or_default(),
            image_path: payload.image_path.clone().unwrap_or_default(),
            alt_text: filled(payload.alt_text.as_deref()).map(str::to_string),
            version: 1,
            created: now_epoch_ms(),
            changed: None,
            creator_id: payload.actor_id,
            changed_user: None,
        };
        let id = self.store.insert(self.conn, &image)?;
        info!("event=image_create module=service status=ok id={id}");
        Ok(id)
    }

    pub fn get_image(&self, id: EntityId) -> ServiceResult<Image> {
        require_id("id", id)?;
        Ok(self.store.get(self.conn, id)?)
    }

    /// Overwrites only the non-blank payload fields.
    pub fn update_image(&self, id: EntityId, payload: &ImagePayload) -> ServiceResult<EntityId> {
        require_id("id", id)?;
        if payload.is_empty() {
            return Err(ServiceError::validation("image update carries no fields"));
        }

        let mut image = self.store.get(self.conn, id)?;
        if let Some(value) = filled(payload.file_name.as_deref()) {
            image.file_name = value.to_string();
        }
        if let Some(value) = filled(payload.image_data.as_deref()) {
            image.image_data = value.to_string();
        }
        if let Some(value) = filled(payload.image_path.as_deref()) {
            image.image_path = value.to_string();
        }
        if let Some(value) = filled(payload.alt_text.as_deref()) {
            image.alt_text = Some(value.to_string());
        }
        image.version += 1;
        image.changed = Some(now_epoch_ms());
        image.changed_user = payload.actor_id;

        self.store.update(self.conn, &image)?;
        info!(
            "event=image_update module=service status=ok id={id} version={}",
            image.version
        );
        Ok(id)
    }

    pub fn delete_image(&self, id: EntityId) -> ServiceResult<bool> {
        require_id("id", id)?;
        let deleted = self.store.delete(self.conn, id)?;
        info!("event=image_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    pub fn list_images(&self, query: &ListQuery) -> ServiceResult<Vec<Image>> {
        Ok(self.store.list(self.conn, query)?)
    }
}

impl SubResourceService for ImageService<'_> {
    type Resource = Image;
    type Payload = ImagePayload;

    const KIND: &'static str = Image::KIND;

    fn create(&self, payload: &ImagePayload) -> ServiceResult<EntityId> {
        self.create_image(payload)
    }

    fn get(&self, id: EntityId) -> ServiceResult<Image> {
        self.get_image(id)
    }

    fn update(&self, id: EntityId, payload: &ImagePayload) -> ServiceResult<EntityId> {
        self.update_image(id, payload)
    }

    fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.delete_image(id)
    }
}
