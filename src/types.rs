use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wire::null_as_default;

/// Free-form JSON object carried in record `data` fields.
pub type JsonObject = Map<String, Value>;

/// A DNS zone as returned by the API. Missing or `null` fields read as their
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub catch_all: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forwarding: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regex: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub master: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /zones`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateZoneRequest {
    pub domain: String,
    pub active: bool,
    pub catch_all: bool,
    pub forwarding: bool,
    pub regex: bool,
    pub master: bool,
    /// Comma-separated tag list.
    pub tags: String,
}

/// Body of `POST /zones/{id}`. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateZoneRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// A DNS record with its nested JSON payloads already decoded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub id: i64,
    pub zone_id: i64,
    pub active: bool,
    pub class: String,
    pub record_type: String,
    pub ttl: i64,
    /// Type-specific record data. `None` when the server sent none.
    pub data: Option<JsonObject>,
    pub is_conditional: bool,
    pub conditional_count: i64,
    pub conditional_limit: i64,
    pub conditional_reset: bool,
    /// `None` when absent or sent as the empty-object sentinel.
    pub conditional_data: Option<JsonObject>,
}

/// Body of `POST /zones/{zoneId}/records`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreateRecordRequest {
    pub active: bool,
    pub class: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: i64,
    pub data: JsonObject,
    pub is_conditional: bool,
    pub conditional_count: i64,
    pub conditional_limit: i64,
    pub conditional_reset: bool,
    pub conditional_data: JsonObject,
}

/// Body of `POST /zones/{zoneId}/records/{id}`. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateRecordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_conditional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_reset: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_data: Option<JsonObject>,
}
