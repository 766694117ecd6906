//! Book record model and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Metadata for a document attached to a book record.
///
/// Stored as JSONB alongside the record. The wire keys (`name`, `type`,
/// `size`, `url`) are part of the API contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentDescriptor {
    /// Original filename as uploaded
    pub name: String,
    /// MIME type of the uploaded file
    #[serde(rename = "type")]
    pub content_type: String,
    /// Size in bytes
    pub size: i64,
    /// Public URL the stored file is served under
    pub url: String,
}

/// A book record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub author: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub tag: Option<String>,
    #[schema(value_type = Option<DocumentDescriptor>)]
    pub document: Option<Json<DocumentDescriptor>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters accepted by the list endpoint.
///
/// When more than one filter is given the results are the union of the
/// individual matches, not the intersection.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Substring match against the tag field
    pub tag: Option<String>,
    /// Calendar day in DD-MM-YYYY format; matches records created that day
    pub date: Option<String>,
    /// Exact author match
    pub author: Option<String>,
    /// Exact price match
    #[param(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    /// Maximum number of records returned
    pub limit: Option<i64>,
}

/// Fields for creating a book record
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub tag: Option<String>,
    pub document: Option<DocumentDescriptor>,
}

/// Partial changes applied by an update; absent fields keep their
/// previous values.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub tag: Option<String>,
    pub document: Option<DocumentDescriptor>,
}
