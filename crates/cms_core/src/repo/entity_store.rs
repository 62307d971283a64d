//! Generic single-table persistence.
//!
//! # Responsibility
//! - Provide get/insert/update/delete/list for any record implementing
//!   [`Entity`].
//! - Keep SQL text and sort-column resolution inside the persistence boundary.
//!
//! # Invariants
//! - Every call runs on the connection scope passed in by the caller; the
//!   store never begins, commits or rolls back a transaction.
//! - Client-supplied sort fields only reach SQL through
//!   [`Entity::SORT_FIELDS`]. Paging input is validated before any query.
//! - Only `?N` placeholders carry values.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::EntityId;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, Row, ToSql};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by the entity store and link repository.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No row with this id exists in the entity table.
    NotFound { kind: &'static str, id: EntityId },
    /// Paging or sort input rejected before touching the database.
    InvalidQuery(String),
    /// Unique, primary-key or foreign-key constraint rejected the write.
    Conflict(String),
    /// Connection schema is not at the version this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted value cannot be converted back into a record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
            Self::Conflict(message) => write!(f, "constraint conflict: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation
                && is_key_constraint(failure.extended_code)
            {
                return Self::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

fn is_key_constraint(extended_code: i32) -> bool {
    matches!(
        extended_code,
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            | rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Table mapping for one record type.
pub trait Entity: Sized {
    /// Snake-case record name used in errors and log events.
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Column list in `to_values` order. The first column is always `id`.
    const COLUMNS: &'static [&'static str];
    /// Allow-list of `(public sort name, column)` pairs.
    const SORT_FIELDS: &'static [(&'static str, &'static str)];

    fn id(&self) -> EntityId;
    fn to_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Sort direction accepted by list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Offset/limit page request with optional client sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    pub page_offset: i64,
    pub page_limit: i64,
}

impl ListQuery {
    /// Page request sorted by id ascending.
    pub fn page(page_offset: i64, page_limit: i64) -> Self {
        Self {
            sort_field: None,
            sort_order: None,
            page_offset,
            page_limit,
        }
    }

    /// Sets the client sort field and direction.
    pub fn sorted_by(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order.into());
        self
    }
}

/// Validated, SQL-safe form of a [`ListQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPage {
    pub column: &'static str,
    pub order: SortOrder,
    pub offset: i64,
    pub limit: i64,
}

/// Validates paging and maps the sort field through `E::SORT_FIELDS`.
///
/// Blank sort field/order fall back to `id ASC`.
pub fn resolve_page<E: Entity>(query: &ListQuery) -> RepoResult<ResolvedPage> {
    if query.page_offset < 0 {
        return Err(RepoError::InvalidQuery(format!(
            "page_offset must be >= 0, got {}",
            query.page_offset
        )));
    }
    if query.page_limit <= 0 {
        return Err(RepoError::InvalidQuery(format!(
            "page_limit must be > 0, got {}",
            query.page_limit
        )));
    }

    let column = match non_blank(query.sort_field.as_deref()) {
        None => "id",
        Some(field) => E::SORT_FIELDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, column)| *column)
            .ok_or_else(|| {
                RepoError::InvalidQuery(format!("unsupported sort field `{field}` for {}", E::KIND))
            })?,
    };
    let order = match non_blank(query.sort_order.as_deref()) {
        None => SortOrder::Asc,
        Some(value) => SortOrder::parse(value).ok_or_else(|| {
            RepoError::InvalidQuery(format!("unsupported sort order `{value}`"))
        })?,
    };

    Ok(ResolvedPage {
        column,
        order,
        offset: query.page_offset,
        limit: query.page_limit,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Stateless CRUD over `E::TABLE`.
pub struct EntityStore<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EntityStore<E> {}

impl<E> Default for EntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("EntityStore")
    }
}

impl<E> EntityStore<E> {
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityStore<E> {
    /// Loads one record; absent rows are `RepoError::NotFound`.
    pub fn get(&self, conn: &Connection, id: EntityId) -> RepoResult<E> {
        self.find(conn, id)?
            .ok_or(RepoError::NotFound { kind: E::KIND, id })
    }

    /// Loads one record if present.
    pub fn find(&self, conn: &Connection, id: EntityId) -> RepoResult<Option<E>> {
        self.find_by(conn, "id", id.to_string())
    }

    /// Loads the first record whose `column` equals `value`.
    ///
    /// `column` is chosen by calling code (natural keys), never by clients.
    pub fn find_by(
        &self,
        conn: &Connection,
        column: &'static str,
        value: impl ToSql,
    ) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {column} = ?1 LIMIT 1;", select_sql::<E>());
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn insert(&self, conn: &Connection, entity: &E) -> RepoResult<EntityId> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            E::TABLE,
            E::COLUMNS.join(", ")
        );
        conn.execute(&sql, params_from_iter(entity.to_values()))?;
        Ok(entity.id())
    }

    /// Overwrites every non-id column of an existing row.
    pub fn update(&self, conn: &Connection, entity: &E) -> RepoResult<EntityId> {
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = ?1;", E::TABLE);
        let changed = conn.execute(&sql, params_from_iter(entity.to_values()))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: E::KIND,
                id: entity.id(),
            });
        }
        Ok(entity.id())
    }

    pub fn delete(&self, conn: &Connection, id: EntityId) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", E::TABLE);
        let changed = conn.execute(&sql, [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: E::KIND, id });
        }
        Ok(true)
    }

    /// Lists one page. Ties on the sort column are broken by `id ASC`.
    pub fn list(&self, conn: &Connection, query: &ListQuery) -> RepoResult<Vec<E>> {
        let page = resolve_page::<E>(query)?;
        let sql = format!(
            "{} ORDER BY {} {}, id ASC LIMIT ?1 OFFSET ?2;",
            select_sql::<E>(),
            page.column,
            page.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([page.limit, page.offset])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(E::from_row(row)?);
        }
        Ok(items)
    }
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

/// Verifies the connection is migrated and carries the given tables.
pub fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{resolve_page, ListQuery, RepoError, SortOrder};
    use crate::model::image::Image;

    #[test]
    fn blank_sort_defaults_to_id_ascending() {
        let query = ListQuery {
            sort_field: Some("  ".to_string()),
            sort_order: Some(String::new()),
            page_offset: 0,
            page_limit: 5,
        };
        let page = resolve_page::<Image>(&query).expect("blank sort should default");
        assert_eq!(page.column, "id");
        assert_eq!(page.order, SortOrder::Asc);
    }

    #[test]
    fn sort_field_matches_allow_list_case_insensitively() {
        let query = ListQuery::page(0, 5).sorted_by("FileName", "DESC");
        let page = resolve_page::<Image>(&query).expect("allow-listed field");
        assert_eq!(page.column, "file_name");
        assert_eq!(page.order, SortOrder::Desc);
    }

    #[test]
    fn injected_sort_field_is_rejected() {
        let query = ListQuery::page(0, 5).sorted_by("id; DROP TABLE images", "asc");
        let err = resolve_page::<Image>(&query).unwrap_err();
        assert!(matches!(err, RepoError::InvalidQuery(_)));
    }

    #[test]
    fn negative_offset_and_zero_limit_are_rejected() {
        assert!(matches!(
            resolve_page::<Image>(&ListQuery::page(-1, 5)),
            Err(RepoError::InvalidQuery(_))
        ));
        assert!(matches!(
            resolve_page::<Image>(&ListQuery::page(0, 0)),
            Err(RepoError::InvalidQuery(_))
        ));
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let query = ListQuery::page(0, 5).sorted_by("id", "sideways");
        assert!(matches!(
            resolve_page::<Image>(&query),
            Err(RepoError::InvalidQuery(_))
        ));
    }
}
