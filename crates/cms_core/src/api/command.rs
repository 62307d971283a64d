//! JSON command routing.
//!
//! A command is `{ "operation": "<resource>.<action>", "payload": {...} }`.
//! Resources: `image`, `attachment`, `api_tag`, `faq_category`,
//! `api_endpoint`, `faq`. Actions: `create`, `get`, `update`, `delete`,
//! `list`, plus `api_tag.resolve`.

use crate::api::envelope::{safe_execute, Response};
use crate::error::{ServiceError, ServiceResult};
use crate::model::EntityId;
use crate::reconcile::resolver::TagResolver;
use crate::repo::entity_store::ListQuery;
use crate::service::api_endpoint_service::{
    ApiEndpointRequest, ApiEndpointService, UpdateApiEndpointRequest,
};
use crate::service::api_tag_service::{ApiTagService, CreateApiTagRequest, UpdateApiTagRequest};
use crate::service::attachment_service::{AttachmentPayload, AttachmentService};
use crate::service::faq_category_service::{
    FaqCategoryRequest, FaqCategoryService, UpdateFaqCategoryRequest,
};
use crate::service::faq_service::{FaqRequest, FaqService, UpdateFaqRequest};
use crate::service::image_service::{ImagePayload, ImageService};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub operation: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Deserialize)]
struct IdPayload {
    id: EntityId,
}

#[derive(Deserialize)]
struct NamePayload {
    name: String,
}

#[derive(Deserialize)]
struct ImageUpdate {
    id: EntityId,
    #[serde(flatten)]
    image: ImagePayload,
}

#[derive(Deserialize)]
struct AttachmentUpdate {
    id: EntityId,
    #[serde(flatten)]
    attachment: AttachmentPayload,
}

/// Executes one command and wraps the outcome in the response envelope.
pub fn execute(conn: &Connection, command: Command) -> Response<Value> {
    let Command { operation, payload } = command;
    safe_execute(&operation, || dispatch(conn, &operation, payload))
}

fn dispatch(conn: &Connection, operation: &str, payload: Value) -> ServiceResult<Value> {
    let (resource, action) = operation
        .split_once('.')
        .ok_or_else(|| unknown(operation))?;
    match resource {
        "image" => image(conn, action, payload),
        "attachment" => attachment(conn, action, payload),
        "api_tag" => api_tag(conn, action, payload),
        "faq_category" => faq_category(conn, action, payload),
        "api_endpoint" => api_endpoint(conn, action, payload),
        "faq" => faq(conn, action, payload),
        _ => Err(unknown(operation)),
    }
}

fn image(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = ImageService::try_new(conn)?;
    match action {
        "create" => reply(service.create_image(&parse::<ImagePayload>(payload)?)?),
        "get" => reply(service.get_image(parse::<IdPayload>(payload)?.id)?),
        "update" => {
            let update: ImageUpdate = parse(payload)?;
            reply(service.update_image(update.id, &update.image)?)
        }
        "delete" => reply(service.delete_image(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_images(&parse::<ListQuery>(payload)?)?),
        _ => Err(unknown(action)),
    }
}

fn attachment(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = AttachmentService::try_new(conn)?;
    match action {
        "create" => reply(service.create_attachment(&parse::<AttachmentPayload>(payload)?)?),
        "get" => reply(service.get_attachment(parse::<IdPayload>(payload)?.id)?),
        "update" => {
            let update: AttachmentUpdate = parse(payload)?;
            reply(service.update_attachment(update.id, &update.attachment)?)
        }
        "delete" => reply(service.delete_attachment(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_attachments(&parse::<ListQuery>(payload)?)?),
        _ => Err(unknown(action)),
    }
}

fn api_tag(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = ApiTagService::try_new(conn)?;
    match action {
        "create" => reply(service.create_tag(&parse::<CreateApiTagRequest>(payload)?)?),
        "get" => reply(service.get_tag(parse::<IdPayload>(payload)?.id)?),
        "update" => reply(service.update_tag(&parse::<UpdateApiTagRequest>(payload)?)?),
        "delete" => reply(service.delete_tag(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_tags(&parse::<ListQuery>(payload)?)?),
        "resolve" => {
            let resolved = service.resolve_or_create(&parse::<NamePayload>(payload)?.name)?;
            reply(serde_json::json!({ "id": resolved.id, "created": resolved.created }))
        }
        _ => Err(unknown(action)),
    }
}

fn faq_category(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = FaqCategoryService::try_new(conn)?;
    match action {
        "create" => reply(service.create_category(&parse::<FaqCategoryRequest>(payload)?)?),
        "get" => reply(service.get_category(parse::<IdPayload>(payload)?.id)?),
        "update" => {
            reply(service.update_category(&parse::<UpdateFaqCategoryRequest>(payload)?)?)
        }
        "delete" => reply(service.delete_category(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_categories(&parse::<ListQuery>(payload)?)?),
        _ => Err(unknown(action)),
    }
}

fn api_endpoint(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = ApiEndpointService::try_new(conn)?;
    match action {
        "create" => reply(service.create_endpoint(parse::<ApiEndpointRequest>(payload)?)?),
        "get" => reply(service.get_endpoint(parse::<IdPayload>(payload)?.id)?),
        "update" => {
            reply(service.update_endpoint(parse::<UpdateApiEndpointRequest>(payload)?)?)
        }
        "delete" => reply(service.delete_endpoint(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_endpoints(&parse::<ListQuery>(payload)?)?),
        _ => Err(unknown(action)),
    }
}

fn faq(conn: &Connection, action: &str, payload: Value) -> ServiceResult<Value> {
    let service = FaqService::try_new(conn)?;
    match action {
        "create" => reply(service.create_faq(parse::<FaqRequest>(payload)?)?),
        "get" => reply(service.get_faq(parse::<IdPayload>(payload)?.id)?),
        "update" => reply(service.update_faq(parse::<UpdateFaqRequest>(payload)?)?),
        "delete" => reply(service.delete_faq(parse::<IdPayload>(payload)?.id)?),
        "list" => reply(service.list_faqs(&parse::<ListQuery>(payload)?)?),
        _ => Err(unknown(action)),
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> ServiceResult<T> {
    serde_json::from_value(payload)
        .map_err(|err| ServiceError::validation(format!("malformed payload: {err}")))
}

fn reply<T: Serialize>(value: T) -> ServiceResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| ServiceError::technical(format!("cannot encode response: {err}")))
}

fn unknown(operation: &str) -> ServiceError {
    ServiceError::validation(format!("unknown operation `{operation}`"))
}
