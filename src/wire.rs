use serde::{Deserialize, Deserializer};

/// Record as sent by the server, with `data` and `conditional_data` still
/// holding JSON-encoded strings.
///
/// Every field tolerates both a missing key and an explicit `null`.
#[derive(Debug, Deserialize)]
pub struct RecordEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zone_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, rename = "cls", deserialize_with = "null_as_default")]
    pub class: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_conditional: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditional_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditional_limit: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditional_reset: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditional_data: String,
}

/// Reads `null` as `T::default()`. Pair with `#[serde(default)]` so a missing
/// key is accepted too.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
