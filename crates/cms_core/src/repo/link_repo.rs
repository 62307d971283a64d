//! Association link (join table) persistence.
//!
//! # Responsibility
//! - Read and mutate `(parent, child)` rows of one join table.
//!
//! # Invariants
//! - Link rows have no lifecycle of their own; they are written only as a
//!   function of the parent's requested association set.
//! - `UNIQUE(parent, child)` on every link table keeps per-parent child ids
//!   duplicate-free.
//! - Like the entity store, calls run on the caller's connection scope.

use crate::model::EntityId;
use crate::repo::codec::parse_id;
use crate::repo::entity_store::RepoResult;
use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Static description of one join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTable {
    pub table: &'static str,
    pub parent_column: &'static str,
    pub child_column: &'static str,
}

/// Endpoint ↔ API tag links.
pub const API_ENDPOINT_TAGS: LinkTable = LinkTable {
    table: "api_endpoint_tags",
    parent_column: "api_endpoint_id",
    child_column: "api_tag_id",
};

/// FAQ ↔ FAQ category links.
pub const FAQ_FAQ_CATEGORIES: LinkTable = LinkTable {
    table: "faq_faq_categories",
    parent_column: "faq_id",
    child_column: "faq_category_id",
};

impl LinkTable {
    /// Child ids currently linked to `parent_id`.
    pub fn linked_ids(
        &self,
        conn: &Connection,
        parent_id: EntityId,
    ) -> RepoResult<BTreeSet<EntityId>> {
        let sql = format!(
            "SELECT {child} FROM {table} WHERE {parent} = ?1;",
            child = self.child_column,
            table = self.table,
            parent = self.parent_column,
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([parent_id.to_string()])?;
        let mut ids = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.insert(parse_id(&text, self.child_column)?);
        }
        Ok(ids)
    }

    /// Child ids for several parents at once, keyed by parent id.
    ///
    /// Parents without links are present with an empty set.
    pub fn linked_ids_for(
        &self,
        conn: &Connection,
        parent_ids: &[EntityId],
    ) -> RepoResult<BTreeMap<EntityId, BTreeSet<EntityId>>> {
        let mut result = BTreeMap::new();
        for parent_id in parent_ids {
            result.insert(*parent_id, self.linked_ids(conn, *parent_id)?);
        }
        Ok(result)
    }

    pub fn insert(
        &self,
        conn: &Connection,
        parent_id: EntityId,
        child_id: EntityId,
    ) -> RepoResult<()> {
        let sql = format!(
            "INSERT INTO {table} (id, {parent}, {child}) VALUES (?1, ?2, ?3);",
            table = self.table,
            parent = self.parent_column,
            child = self.child_column,
        );
        conn.execute(
            &sql,
            params![
                Uuid::new_v4().to_string(),
                parent_id.to_string(),
                child_id.to_string()
            ],
        )?;
        Ok(())
    }

    /// Removes one link; returns whether a row existed.
    pub fn delete(
        &self,
        conn: &Connection,
        parent_id: EntityId,
        child_id: EntityId,
    ) -> RepoResult<bool> {
        let sql = format!(
            "DELETE FROM {table} WHERE {parent} = ?1 AND {child} = ?2;",
            table = self.table,
            parent = self.parent_column,
            child = self.child_column,
        );
        let changed = conn.execute(&sql, params![parent_id.to_string(), child_id.to_string()])?;
        Ok(changed > 0)
    }

    /// Removes every link of one parent; returns the number of rows removed.
    pub fn delete_all(&self, conn: &Connection, parent_id: EntityId) -> RepoResult<usize> {
        let sql = format!(
            "DELETE FROM {table} WHERE {parent} = ?1;",
            table = self.table,
            parent = self.parent_column,
        );
        Ok(conn.execute(&sql, [parent_id.to_string()])?)
    }
}
