//! Serialized side-facts attached to a recorded call.
//!
//! An [`Extra`] is the wire form of a structured record. Records implement
//! [`ToExtra`]; the sink only ever sees the snapshot, never the live record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which record an [`Extra`] was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKind {
    ProgramInfo,
    AndroidNativeBufferExtra,
}

/// A serialized record ready to be attached to a trace call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    kind: ExtraKind,
    payload: Value,
}

impl Extra {
    /// Wraps an already-serialized payload.
    pub fn new(kind: ExtraKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// Serializes `record` into an extra of the given kind.
    ///
    /// Records in this crate are plain data, so serialization cannot fail for
    /// them; a failing `Serialize` impl yields a `null` payload.
    pub fn from_record<T: Serialize>(kind: ExtraKind, record: &T) -> Self {
        let payload = serde_json::to_value(record).unwrap_or(Value::Null);
        Self { kind, payload }
    }

    pub fn kind(&self) -> ExtraKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Renders the extra as a compact JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Pure conversion of a record into its wire form.
pub trait ToExtra {
    fn to_extra(&self) -> Extra;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        width: i32,
    }

    #[test]
    fn from_record_serializes_payload() {
        let extra = Extra::from_record(ExtraKind::AndroidNativeBufferExtra, &Sample { width: 3 });
        assert_eq!(extra.kind(), ExtraKind::AndroidNativeBufferExtra);
        assert_eq!(extra.payload(), &json!({"width": 3}));
    }

    #[test]
    fn to_json_tags_kind_in_snake_case() {
        let extra = Extra::new(ExtraKind::ProgramInfo, json!({}));
        let text = extra.to_json().unwrap();
        assert!(text.contains("\"program_info\""), "got: {text}");
    }

    #[test]
    fn extra_round_trips_through_json() {
        let extra = Extra::new(ExtraKind::ProgramInfo, json!({"link_status": true}));
        let back: Extra = serde_json::from_str(&extra.to_json().unwrap()).unwrap();
        assert_eq!(back, extra);
    }
}
