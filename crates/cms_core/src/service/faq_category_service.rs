//! FAQ category service.
//!
//! Categories are never created implicitly; FAQs reference them by id and
//! resolve them through [`AssociationLookup`].

use crate::error::ServiceResult;
use crate::model::faq::FaqCategory;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::resolver::AssociationLookup;
use crate::repo::entity_store::{ensure_connection_ready, Entity, EntityStore, ListQuery};
use crate::service::validation::{filled, require_id, require_text};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFaqCategoryRequest {
    pub id: EntityId,
    #[serde(flatten)]
    pub category: FaqCategoryRequest,
}

pub struct FaqCategoryService<'conn> {
    conn: &'conn Connection,
    store: EntityStore<FaqCategory>,
}

impl<'conn> FaqCategoryService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[FaqCategory::TABLE])?;
        Ok(Self {
            conn,
            store: EntityStore::new(),
        })
    }

    pub fn create_category(&self, request: &FaqCategoryRequest) -> ServiceResult<EntityId> {
        require_text("name", &request.name)?;
        let category = FaqCategory {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: filled(request.description.as_deref()).map(str::to_string),
            version: 1,
            created: now_epoch_ms(),
            changed: None,
        };
        let id = self.store.insert(self.conn, &category)?;
        info!("event=faq_category_create module=service status=ok id={id}");
        Ok(id)
    }

    pub fn get_category(&self, id: EntityId) -> ServiceResult<FaqCategory> {
        require_id("id", id)?;
        Ok(self.store.get(self.conn, id)?)
    }

    pub fn update_category(&self, request: &UpdateFaqCategoryRequest) -> ServiceResult<EntityId> {
        require_id("id", request.id)?;
        require_text("name", &request.category.name)?;

        let mut category = self.store.get(self.conn, request.id)?;
        category.name = request.category.name.trim().to_string();
        category.description = filled(request.category.description.as_deref()).map(str::to_string);
        category.version += 1;
        category.changed = Some(now_epoch_ms());
        self.store.update(self.conn, &category)?;
        info!(
            "event=faq_category_update module=service status=ok id={} version={}",
            category.id, category.version
        );
        Ok(category.id)
    }

    /// Fails with a conflict while any FAQ still links the category.
    pub fn delete_category(&self, id: EntityId) -> ServiceResult<bool> {
        require_id("id", id)?;
        let deleted = self.store.delete(self.conn, id)?;
        info!("event=faq_category_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    pub fn list_categories(&self, query: &ListQuery) -> ServiceResult<Vec<FaqCategory>> {
        Ok(self.store.list(self.conn, query)?)
    }
}

impl AssociationLookup for FaqCategoryService<'_> {
    type Target = FaqCategory;

    fn get(&self, id: EntityId) -> ServiceResult<FaqCategory> {
        self.get_category(id)
    }
}
