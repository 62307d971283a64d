//! Value conversions between records and SQLite columns.
//!
//! Ids are stored as hyphenated UUID text, booleans as strict `0/1` integers.

use crate::model::EntityId;
use crate::repo::entity_store::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

pub fn id_value(id: EntityId) -> Value {
    Value::Text(id.to_string())
}

pub fn opt_id_value(id: Option<EntityId>) -> Value {
    id.map_or(Value::Null, id_value)
}

pub fn text_value(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn opt_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text_value)
}

pub fn flag_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub fn parse_id(value: &str, column: &str) -> RepoResult<EntityId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub fn read_id(row: &Row<'_>, table: &str, column: &str) -> RepoResult<EntityId> {
    let text: String = row.get(column)?;
    parse_id(&text, &format!("{table}.{column}"))
}

pub fn read_opt_id(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Option<EntityId>> {
    row.get::<_, Option<String>>(column)?
        .map(|text| parse_id(&text, &format!("{table}.{column}")))
        .transpose()
}

pub fn read_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}
