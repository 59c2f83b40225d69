use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::{Error, Result};

/// A structural type descriptor, matching the JSON type specifications the
/// wire protocol embeds in schemas and dynamically-typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Number,
    String,
    /// The type travels with the value rather than with the schema.
    Dynamic,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Tuple(Vec<Type>),
    Object(BTreeMap<String, Type>),
}

impl Type {
    /// Parse a JSON type specification, e.g. `"string"` or
    /// `["object",{"a":"number"}]`.
    pub fn from_json(src: &[u8]) -> Result<Type> {
        let spec: Json =
            serde_json::from_slice(src).map_err(|e| Error::InvalidTypeSpec(e.to_string()))?;
        Self::from_spec(&spec)
    }

    pub(crate) fn from_spec(spec: &Json) -> Result<Type> {
        match spec {
            Json::String(name) => match name.as_str() {
                "bool" => Ok(Type::Bool),
                "number" => Ok(Type::Number),
                "string" => Ok(Type::String),
                "dynamic" => Ok(Type::Dynamic),
                other => Err(Error::InvalidTypeSpec(format!(
                    "unknown primitive type {:?}",
                    other
                ))),
            },
            Json::Array(parts) => {
                let kind = parts.first().and_then(Json::as_str).ok_or_else(|| {
                    Error::InvalidTypeSpec(
                        "compound type spec must start with a kind string".to_string(),
                    )
                })?;
                match kind {
                    "list" | "set" | "map" => {
                        if parts.len() != 2 {
                            return Err(Error::InvalidTypeSpec(format!(
                                "{:?} type spec must have exactly one element type",
                                kind
                            )));
                        }
                        let elem = Box::new(Self::from_spec(&parts[1])?);
                        Ok(match kind {
                            "list" => Type::List(elem),
                            "set" => Type::Set(elem),
                            _ => Type::Map(elem),
                        })
                    }
                    "tuple" => {
                        let elems = parts.get(1).and_then(Json::as_array).ok_or_else(|| {
                            Error::InvalidTypeSpec(
                                "tuple type spec must carry an array of element types".to_string(),
                            )
                        })?;
                        let etys = elems.iter().map(Self::from_spec).collect::<Result<_>>()?;
                        Ok(Type::Tuple(etys))
                    }
                    "object" => {
                        // A third element lists optional attributes; it does
                        // not affect the structural shape and is ignored.
                        let attrs = parts.get(1).and_then(Json::as_object).ok_or_else(|| {
                            Error::InvalidTypeSpec(
                                "object type spec must carry an attribute map".to_string(),
                            )
                        })?;
                        let atys = attrs
                            .iter()
                            .map(|(name, aspec)| Ok((name.clone(), Self::from_spec(aspec)?)))
                            .collect::<Result<_>>()?;
                        Ok(Type::Object(atys))
                    }
                    other => Err(Error::InvalidTypeSpec(format!(
                        "unknown compound type kind {:?}",
                        other
                    ))),
                }
            }
            _ => Err(Error::InvalidTypeSpec(
                "type spec must be a string or an array".to_string(),
            )),
        }
    }

    /// The JSON type specification for this type.
    pub fn to_json(&self) -> Vec<u8> {
        self.to_spec().to_string().into_bytes()
    }

    pub(crate) fn to_spec(&self) -> Json {
        match self {
            Type::Bool => Json::String("bool".to_string()),
            Type::Number => Json::String("number".to_string()),
            Type::String => Json::String("string".to_string()),
            Type::Dynamic => Json::String("dynamic".to_string()),
            Type::List(elem) => Json::Array(vec!["list".into(), elem.to_spec()]),
            Type::Set(elem) => Json::Array(vec!["set".into(), elem.to_spec()]),
            Type::Map(elem) => Json::Array(vec!["map".into(), elem.to_spec()]),
            Type::Tuple(etys) => Json::Array(vec![
                "tuple".into(),
                Json::Array(etys.iter().map(Type::to_spec).collect()),
            ]),
            Type::Object(atys) => Json::Array(vec![
                "object".into(),
                Json::Object(
                    atys.iter()
                        .map(|(name, aty)| (name.clone(), aty.to_spec()))
                        .collect(),
                ),
            ]),
        }
    }
}
