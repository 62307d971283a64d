//! Table mappings for every catalog record.
//!
//! # Invariants
//! - `COLUMNS` order matches `to_values` order exactly.
//! - `SORT_FIELDS` is the complete set of client-sortable columns.

use crate::model::api_endpoint::ApiEndpoint;
use crate::model::api_tag::ApiTag;
use crate::model::attachment::Attachment;
use crate::model::faq::{Faq, FaqCategory};
use crate::model::image::Image;
use crate::model::EntityId;
use crate::repo::codec::{
    flag_value, id_value, opt_id_value, opt_text_value, read_flag, read_id, read_opt_id,
    text_value,
};
use crate::repo::entity_store::{Entity, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for Image {
    const KIND: &'static str = "image";
    const TABLE: &'static str = "images";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "file_name",
        "image_data",
        "image_path",
        "alt_text",
        "version",
        "created",
        "changed",
        "creator_id",
        "changed_user",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("fileName", "file_name"),
        ("imagePath", "image_path"),
        ("version", "version"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.file_name),
            text_value(&self.image_data),
            text_value(&self.image_path),
            opt_text_value(self.alt_text.as_deref()),
            Value::Integer(self.version),
            Value::Integer(self.created),
            Value::from(self.changed),
            opt_id_value(self.creator_id),
            opt_id_value(self.changed_user),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            file_name: row.get("file_name")?,
            image_data: row.get("image_data")?,
            image_path: row.get("image_path")?,
            alt_text: row.get("alt_text")?,
            version: row.get("version")?,
            created: row.get("created")?,
            changed: row.get("changed")?,
            creator_id: read_opt_id(row, Self::TABLE, "creator_id")?,
            changed_user: read_opt_id(row, Self::TABLE, "changed_user")?,
        })
    }
}

impl Entity for Attachment {
    const KIND: &'static str = "attachment";
    const TABLE: &'static str = "attachments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "file_name",
        "file_url",
        "file_path",
        "version",
        "created",
        "changed",
        "changed_user",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("fileName", "file_name"),
        ("filePath", "file_path"),
        ("version", "version"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.file_name),
            Value::Blob(self.file_url.clone()),
            text_value(&self.file_path),
            Value::Integer(self.version),
            Value::Integer(self.created),
            Value::from(self.changed),
            opt_id_value(self.changed_user),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            file_name: row.get("file_name")?,
            file_url: row.get("file_url")?,
            file_path: row.get("file_path")?,
            version: row.get("version")?,
            created: row.get("created")?,
            changed: row.get("changed")?,
            changed_user: read_opt_id(row, Self::TABLE, "changed_user")?,
        })
    }
}

impl Entity for ApiTag {
    const KIND: &'static str = "api_tag";
    const TABLE: &'static str = "api_tags";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "version",
        "created",
        "creator_id",
        "changed",
        "changed_user",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("name", "name"),
        ("version", "version"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.name),
            Value::Integer(self.version),
            Value::Integer(self.created),
            opt_id_value(self.creator_id),
            Value::from(self.changed),
            opt_id_value(self.changed_user),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            name: row.get("name")?,
            version: row.get("version")?,
            created: row.get("created")?,
            creator_id: read_opt_id(row, Self::TABLE, "creator_id")?,
            changed: row.get("changed")?,
            changed_user: read_opt_id(row, Self::TABLE, "changed_user")?,
        })
    }
}

impl Entity for ApiEndpoint {
    const KIND: &'static str = "api_endpoint";
    const TABLE: &'static str = "api_endpoints";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "api_name",
        "api_scope",
        "api_scope_production",
        "deprecated",
        "description",
        "documentation",
        "endpoint_urls",
        "app_environment",
        "swagger",
        "tour",
        "api_version",
        "langcode",
        "sticky",
        "promote",
        "url_alias",
        "published",
        "version",
        "created",
        "changed",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("apiName", "api_name"),
        ("apiVersion", "api_version"),
        ("langcode", "langcode"),
        ("urlAlias", "url_alias"),
        ("published", "published"),
        ("deprecated", "deprecated"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.api_name),
            opt_text_value(self.api_scope.as_deref()),
            opt_text_value(self.api_scope_production.as_deref()),
            flag_value(self.deprecated),
            opt_text_value(self.description.as_deref()),
            opt_id_value(self.documentation),
            opt_text_value(self.endpoint_urls.as_deref()),
            id_value(self.app_environment),
            opt_id_value(self.swagger),
            opt_id_value(self.tour),
            opt_text_value(self.api_version.as_deref()),
            text_value(&self.langcode),
            flag_value(self.sticky),
            flag_value(self.promote),
            text_value(&self.url_alias),
            flag_value(self.published),
            Value::Integer(self.version),
            Value::Integer(self.created),
            Value::from(self.changed),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            api_name: row.get("api_name")?,
            api_scope: row.get("api_scope")?,
            api_scope_production: row.get("api_scope_production")?,
            deprecated: read_flag(row, Self::TABLE, "deprecated")?,
            description: row.get("description")?,
            documentation: read_opt_id(row, Self::TABLE, "documentation")?,
            endpoint_urls: row.get("endpoint_urls")?,
            app_environment: read_id(row, Self::TABLE, "app_environment")?,
            swagger: read_opt_id(row, Self::TABLE, "swagger")?,
            tour: read_opt_id(row, Self::TABLE, "tour")?,
            api_version: row.get("api_version")?,
            langcode: row.get("langcode")?,
            sticky: read_flag(row, Self::TABLE, "sticky")?,
            promote: read_flag(row, Self::TABLE, "promote")?,
            url_alias: row.get("url_alias")?,
            published: read_flag(row, Self::TABLE, "published")?,
            version: row.get("version")?,
            created: row.get("created")?,
            changed: row.get("changed")?,
        })
    }
}

impl Entity for Faq {
    const KIND: &'static str = "faq";
    const TABLE: &'static str = "faqs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "question",
        "answer",
        "langcode",
        "status",
        "faq_order",
        "created",
        "changed",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("question", "question"),
        ("langcode", "langcode"),
        ("status", "status"),
        ("faqOrder", "faq_order"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.question),
            text_value(&self.answer),
            text_value(&self.langcode),
            flag_value(self.status),
            Value::Integer(self.faq_order),
            Value::Integer(self.created),
            Value::from(self.changed),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            question: row.get("question")?,
            answer: row.get("answer")?,
            langcode: row.get("langcode")?,
            status: read_flag(row, Self::TABLE, "status")?,
            faq_order: row.get("faq_order")?,
            created: row.get("created")?,
            changed: row.get("changed")?,
        })
    }
}

impl Entity for FaqCategory {
    const KIND: &'static str = "faq_category";
    const TABLE: &'static str = "faq_categories";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "version",
        "created",
        "changed",
    ];
    const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("name", "name"),
        ("created", "created"),
        ("changed", "changed"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            text_value(&self.name),
            opt_text_value(self.description.as_deref()),
            Value::Integer(self.version),
            Value::Integer(self.created),
            Value::from(self.changed),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            version: row.get("version")?,
            created: row.get("created")?,
            changed: row.get("changed")?,
        })
    }
}
