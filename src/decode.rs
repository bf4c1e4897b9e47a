use serde::de::DeserializeOwned;

use crate::{wire::RecordEnvelope, JsonObject, Record, SnitchDnsError};

/// Sentinel the server uses for "no conditional data".
const EMPTY_OBJECT: &str = "{}";

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, SnitchDnsError> {
    serde_json::from_slice(body).map_err(|source| SnitchDnsError::Unmarshal {
        target: "response",
        source,
    })
}

pub(crate) fn decode_record(body: &[u8]) -> Result<Record, SnitchDnsError> {
    let envelope: RecordEnvelope = decode_json(body)?;
    record_from_envelope(envelope)
}

fn record_from_envelope(envelope: RecordEnvelope) -> Result<Record, SnitchDnsError> {
    let data = if envelope.data.is_empty() {
        None
    } else {
        Some(decode_nested(&envelope.data, "data field")?)
    };

    let conditional_data =
        if envelope.conditional_data.is_empty() || envelope.conditional_data == EMPTY_OBJECT {
            None
        } else {
            Some(decode_nested(
                &envelope.conditional_data,
                "conditional_data field",
            )?)
        };

    Ok(Record {
        id: envelope.id,
        zone_id: envelope.zone_id,
        active: envelope.active,
        class: envelope.class,
        record_type: envelope.kind,
        ttl: envelope.ttl,
        data,
        is_conditional: envelope.is_conditional,
        conditional_count: envelope.conditional_count,
        conditional_limit: envelope.conditional_limit,
        conditional_reset: envelope.conditional_reset,
        conditional_data,
    })
}

fn decode_nested(raw: &str, target: &'static str) -> Result<JsonObject, SnitchDnsError> {
    serde_json::from_str(raw).map_err(|source| SnitchDnsError::Unmarshal { target, source })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{decode_json, decode_record};
    use crate::{SnitchDnsError, Zone};

    fn record_body(data: &str, conditional_data: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": 7,
            "zone_id": 3,
            "active": true,
            "cls": "IN",
            "type": "A",
            "ttl": 3600,
            "data": data,
            "is_conditional": false,
            "conditional_data": conditional_data
        }))
        .expect("fixture must serialize")
    }

    #[test]
    fn decodes_double_encoded_data() {
        let record = decode_record(&record_body(r#"{"address":"10.0.0.1"}"#, ""))
            .expect("record must decode");

        assert_eq!(record.id, 7);
        assert_eq!(record.class, "IN");
        assert_eq!(record.record_type, "A");
        let data = record.data.expect("data must be present");
        assert_eq!(data["address"], "10.0.0.1");
        assert!(record.conditional_data.is_none());
    }

    #[test]
    fn empty_object_sentinel_means_absent_conditional_data() {
        let record = decode_record(&record_body(r#"{"address":"10.0.0.1"}"#, "{}"))
            .expect("record must decode");
        assert!(record.conditional_data.is_none());
    }

    #[test]
    fn decodes_conditional_data_when_present() {
        let record = decode_record(&record_body(
            r#"{"address":"10.0.0.1"}"#,
            r#"{"address":"10.0.0.2"}"#,
        ))
        .expect("record must decode");
        let conditional = record.conditional_data.expect("conditional data must be present");
        assert_eq!(conditional["address"], "10.0.0.2");
    }

    #[test]
    fn empty_data_string_is_none() {
        let record = decode_record(&record_body("", "")).expect("record must decode");
        assert!(record.data.is_none());
    }

    #[test]
    fn malformed_nested_data_names_the_field() {
        let err = decode_record(&record_body("{not json", "")).expect_err("must fail");
        match err {
            SnitchDnsError::Unmarshal { target, .. } => assert_eq!(target, "data field"),
            other => panic!("expected unmarshal error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_outer_body_is_response_error() {
        let err = decode_record(b"<html>").expect_err("must fail");
        assert!(matches!(
            err,
            SnitchDnsError::Unmarshal {
                target: "response",
                ..
            }
        ));
    }

    #[test]
    fn null_nested_fields_are_absent() {
        let body = serde_json::to_vec(&json!({
            "id": 7,
            "zone_id": 3,
            "cls": null,
            "type": "A",
            "ttl": null,
            "data": null,
            "conditional_data": null
        }))
        .expect("fixture must serialize");

        let record = decode_record(&body).expect("record with nulls must decode");
        assert_eq!(record.id, 7);
        assert_eq!(record.class, "");
        assert_eq!(record.ttl, 0);
        assert!(record.data.is_none());
        assert!(record.conditional_data.is_none());
    }

    #[test]
    fn null_conditional_data_keeps_data() {
        let body = serde_json::to_vec(&json!({
            "id": 8,
            "data": r#"{"address":"10.0.0.1"}"#,
            "conditional_data": null
        }))
        .expect("fixture must serialize");

        let record = decode_record(&body).expect("record must decode");
        assert_eq!(record.data.expect("data must be present")["address"], "10.0.0.1");
        assert!(record.conditional_data.is_none());
    }

    #[test]
    fn zone_accepts_null_and_missing_fields() {
        let body = br#"{"id": 4, "domain": null, "tags": null, "active": null}"#;
        let zone: Zone = decode_json(body).expect("zone with nulls must decode");
        assert_eq!(zone.id, 4);
        assert_eq!(zone.domain, "");
        assert!(zone.tags.is_empty());
        assert!(!zone.active);

        let zone: Zone = decode_json(br#"{"id": 5}"#).expect("zone without domain must decode");
        assert_eq!(zone.domain, "");
        assert!(zone.created_at.is_none());
    }
}
