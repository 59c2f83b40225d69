//! Conversion between wire envelopes and in-memory values for the memory
//! resource, plus diagnostic construction helpers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use tfcty::{Type, Value};

use crate::grpc::tfplugin6::attribute_path::step::Selector;
use crate::grpc::tfplugin6::attribute_path::Step;
use crate::grpc::tfplugin6::diagnostic::Severity;
use crate::grpc::tfplugin6::{AttributePath, Diagnostic, DynamicValue};

/// The fixed schema of the memory resource. Both attributes are
/// dynamically typed so that a value of any type can be stored.
pub static MEMORY_TYPE: LazyLock<Type> = LazyLock::new(|| {
    Type::Object(BTreeMap::from([
        ("new_value".to_string(), Type::Dynamic),
        ("value".to_string(), Type::Dynamic),
    ]))
});

/// Failure to move a value between a wire envelope and its in-memory form.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// Neither envelope branch is populated.
    #[error("unsupported dynamic value serialization format")]
    UnsupportedFormat,

    /// One of the envelope branches is populated but does not decode
    /// against the memory schema.
    #[error("invalid {format} serialization: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: tfcty::Error,
    },

    /// A value built internally is not representable under the schema.
    #[error("could not serialize value: {0}")]
    Encode(#[source] tfcty::Error),
}

/// Decode whichever branch of a wire envelope is populated, preferring the
/// structured-text form.
pub fn memory_val_from_proto(dv: Option<&DynamicValue>) -> Result<Value, MarshalError> {
    let dv = dv.ok_or(MarshalError::UnsupportedFormat)?;
    if !dv.json.is_empty() {
        memory_val_from_json(&dv.json)
    } else if !dv.msgpack.is_empty() {
        tfcty::msgpack::unmarshal(&dv.msgpack, &MEMORY_TYPE).map_err(|source| {
            MarshalError::Decode {
                format: "msgpack",
                source,
            }
        })
    } else {
        Err(MarshalError::UnsupportedFormat)
    }
}

/// Decode the structured-text form, also used directly for legacy persisted
/// state in UpgradeResourceState.
pub fn memory_val_from_json(src: &[u8]) -> Result<Value, MarshalError> {
    tfcty::json::unmarshal(src, &MEMORY_TYPE).map_err(|source| MarshalError::Decode {
        format: "json",
        source,
    })
}

/// Encode a value into a wire envelope. Output always uses the compact
/// binary branch; the text form is only ever accepted on input.
pub fn memory_val_to_proto(val: &Value) -> Result<DynamicValue, MarshalError> {
    let msgpack = tfcty::msgpack::marshal(val, &MEMORY_TYPE).map_err(MarshalError::Encode)?;
    Ok(DynamicValue {
        msgpack,
        json: Vec::new(),
    })
}

/// A single error diagnostic describing a failure.
pub fn diagnostic_for_err(summary: &str, prefix: &str, err: &impl std::fmt::Display) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error as i32,
        summary: summary.to_string(),
        detail: format!("{}: {}.", prefix, err),
        attribute: None,
    }
}

pub fn diagnostics_for_err(
    summary: &str,
    prefix: &str,
    err: &impl std::fmt::Display,
) -> Vec<Diagnostic> {
    vec![diagnostic_for_err(summary, prefix, err)]
}

/// An attribute path selecting a top-level attribute by name.
pub fn attr_path(name: &str) -> AttributePath {
    AttributePath {
        steps: vec![Step {
            selector: Some(Selector::AttributeName(name.to_string())),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_number(n: i64) -> Value {
        Value::Object(BTreeMap::from([
            ("new_value".to_string(), Value::Null),
            (
                "value".to_string(),
                Value::Dynamic {
                    ty: Type::Number,
                    value: Box::new(Value::Number(serde_json::Number::from(n))),
                },
            ),
        ]))
    }

    #[test]
    fn test_envelope_roundtrip_is_binary_only() {
        let val = stored_number(42);
        let dv = memory_val_to_proto(&val).unwrap();
        assert!(dv.json.is_empty(), "output must use the binary branch");
        assert!(!dv.msgpack.is_empty());
        assert_eq!(memory_val_from_proto(Some(&dv)).unwrap(), val);
    }

    #[test]
    fn test_json_branch_is_preferred_on_input() {
        let dv = DynamicValue {
            msgpack: vec![0xff], // invalid; must not be consulted
            json: br#"{"new_value": null, "value": null}"#.to_vec(),
        };
        let val = memory_val_from_proto(Some(&dv)).unwrap();
        assert_eq!(val.attr("value"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_envelope_is_unsupported() {
        let err = memory_val_from_proto(Some(&DynamicValue::default())).unwrap_err();
        assert!(matches!(err, MarshalError::UnsupportedFormat));
        let err = memory_val_from_proto(None).unwrap_err();
        assert!(matches!(err, MarshalError::UnsupportedFormat));
    }

    #[test]
    fn test_decode_error_names_format() {
        let dv = DynamicValue {
            msgpack: vec![0x81],
            json: Vec::new(),
        };
        let err = memory_val_from_proto(Some(&dv)).unwrap_err();
        assert!(err.to_string().contains("msgpack"), "{}", err);
    }

    #[test]
    fn test_attr_path_shape() {
        let path = attr_path("new_value");
        assert_eq!(path.steps.len(), 1);
        assert_eq!(
            path.steps[0].selector,
            Some(Selector::AttributeName("new_value".to_string()))
        );
    }
}
