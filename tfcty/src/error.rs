/// Errors produced while parsing type specifications or converting values
/// between wire encodings and the schema they must conform to.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A JSON type specification does not describe a known type.
    #[error("invalid type specification: {0}")]
    InvalidTypeSpec(String),

    /// The input is not well-formed for the wire format being decoded.
    #[error("malformed {format} data: {detail}")]
    Malformed {
        format: &'static str,
        detail: String,
    },

    /// The value's structure does not conform to the schema type.
    #[error("{path}: {detail}")]
    Conformance { path: String, detail: String },

    /// Unknown values have no representation in this wire format.
    #[error("{path}: unknown values are not serializable")]
    UnknownValue { path: String },

    /// The underlying writer failed while serializing.
    #[error("{format} encoding failed: {detail}")]
    Encode {
        format: &'static str,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(format: &'static str, detail: impl ToString) -> Self {
        Error::Malformed {
            format,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn conformance(path: &str, detail: impl Into<String>) -> Self {
        Error::Conformance {
            path: display_path(path),
            detail: detail.into(),
        }
    }

    pub(crate) fn unknown_value(path: &str) -> Self {
        Error::UnknownValue {
            path: display_path(path),
        }
    }
}

/// Path of an attribute within the value currently being processed.
pub(crate) fn attr_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Path of a collection element within the value currently being processed.
pub(crate) fn elem_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}
