//! JSON serialization of dynamic values against a type descriptor.
//!
//! The structured-text form of the same conventions as [`crate::msgpack`]:
//! a typed value in a dynamically-typed slot is wrapped as
//! `{"value": V, "type": T}`. Unknown values have no JSON representation,
//! so marshalling one is an error; this format only ever carries fully
//! resolved state.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use crate::error::{attr_path, elem_path};
use crate::value::parse_number;
use crate::{Error, Result, Type, Value};

const FORMAT: &str = "json";

/// Serialize `value` against `ty`.
pub fn marshal(value: &Value, ty: &Type) -> Result<Vec<u8>> {
    let j = write_value(value, ty, "")?;
    Ok(j.to_string().into_bytes())
}

/// Deserialize a value of type `ty` from `src`.
pub fn unmarshal(src: &[u8], ty: &Type) -> Result<Value> {
    let j: Json = serde_json::from_slice(src).map_err(|e| Error::malformed(FORMAT, e))?;
    read_value(&j, ty, "")
}

fn write_value(value: &Value, ty: &Type, path: &str) -> Result<Json> {
    // A typed value in a dynamic slot carries its type specification in a
    // wrapper object; a bare dynamic null stays a plain null.
    if let (Type::Dynamic, Value::Dynamic { ty: vty, value }) = (ty, value) {
        let mut wrapper = Map::new();
        wrapper.insert("value".to_string(), write_value(value.as_ref(), vty, path)?);
        wrapper.insert("type".to_string(), vty.to_spec());
        return Ok(Json::Object(wrapper));
    }
    match (ty, value) {
        (_, Value::Unknown) => Err(Error::unknown_value(path)),
        (_, Value::Null) => Ok(Json::Null),
        (Type::Bool, Value::Bool(b)) => Ok(Json::Bool(*b)),
        (Type::Number, Value::Number(n)) => Ok(Json::Number(n.clone())),
        (Type::String, Value::String(s)) => Ok(Json::String(s.clone())),
        (Type::List(ety) | Type::Set(ety), Value::List(items)) => {
            let elems = items
                .iter()
                .enumerate()
                .map(|(i, item)| write_value(item, ety.as_ref(), &elem_path(path, i)))
                .collect::<Result<_>>()?;
            Ok(Json::Array(elems))
        }
        (Type::Tuple(etys), Value::List(items)) => {
            if items.len() != etys.len() {
                return Err(Error::conformance(
                    path,
                    format!(
                        "a tuple of {} elements is required ({} given)",
                        etys.len(),
                        items.len()
                    ),
                ));
            }
            let elems = items
                .iter()
                .zip(etys)
                .enumerate()
                .map(|(i, (item, ety))| write_value(item, ety, &elem_path(path, i)))
                .collect::<Result<_>>()?;
            Ok(Json::Array(elems))
        }
        (Type::Map(ety), Value::Object(entries)) => {
            let mut m = Map::new();
            for (key, item) in entries {
                m.insert(
                    key.clone(),
                    write_value(item, ety.as_ref(), &attr_path(path, key))?,
                );
            }
            Ok(Json::Object(m))
        }
        (Type::Object(atys), Value::Object(attrs)) => {
            if attrs.len() != atys.len() {
                return Err(Error::conformance(
                    path,
                    format!(
                        "an object with {} attributes is required ({} given)",
                        atys.len(),
                        attrs.len()
                    ),
                ));
            }
            let mut m = Map::new();
            for (name, aty) in atys {
                let item = attrs.get(name).ok_or_else(|| {
                    Error::conformance(path, format!("missing attribute {:?}", name))
                })?;
                m.insert(name.clone(), write_value(item, aty, &attr_path(path, name))?);
            }
            Ok(Json::Object(m))
        }
        _ => Err(Error::conformance(
            path,
            "value does not conform to the schema type",
        )),
    }
}

fn read_value(j: &Json, ty: &Type, path: &str) -> Result<Value> {
    if j.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        Type::Bool => j
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| Error::conformance(path, "a bool is required")),
        Type::Number => match j {
            Json::Number(n) => Ok(Value::Number(n.clone())),
            // Big numbers travel as decimal strings.
            Json::String(s) => parse_number(s)
                .map(Value::Number)
                .ok_or_else(|| Error::conformance(path, format!("invalid number {:?}", s))),
            _ => Err(Error::conformance(path, "a number is required")),
        },
        Type::String => j
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| Error::conformance(path, "a string is required")),
        Type::List(ety) | Type::Set(ety) => {
            let elems = j
                .as_array()
                .ok_or_else(|| Error::conformance(path, "an array is required"))?;
            let items = elems
                .iter()
                .enumerate()
                .map(|(i, elem)| read_value(elem, ety.as_ref(), &elem_path(path, i)))
                .collect::<Result<_>>()?;
            Ok(Value::List(items))
        }
        Type::Tuple(etys) => {
            let elems = j
                .as_array()
                .ok_or_else(|| Error::conformance(path, "an array is required"))?;
            if elems.len() != etys.len() {
                return Err(Error::conformance(
                    path,
                    format!(
                        "a tuple of {} elements is required ({} given)",
                        etys.len(),
                        elems.len()
                    ),
                ));
            }
            let items = elems
                .iter()
                .zip(etys)
                .enumerate()
                .map(|(i, (elem, ety))| read_value(elem, ety, &elem_path(path, i)))
                .collect::<Result<_>>()?;
            Ok(Value::List(items))
        }
        Type::Map(ety) => {
            let obj = j
                .as_object()
                .ok_or_else(|| Error::conformance(path, "a map is required"))?;
            let mut entries = BTreeMap::new();
            for (key, elem) in obj {
                entries.insert(
                    key.clone(),
                    read_value(elem, ety.as_ref(), &attr_path(path, key))?,
                );
            }
            Ok(Value::Object(entries))
        }
        Type::Object(atys) => {
            let obj = j
                .as_object()
                .ok_or_else(|| Error::conformance(path, "an object is required"))?;
            if let Some(key) = obj.keys().find(|key| !atys.contains_key(*key)) {
                return Err(Error::conformance(
                    path,
                    format!("unsupported attribute {:?}", key),
                ));
            }
            let mut attrs = BTreeMap::new();
            for (name, aty) in atys {
                let elem = obj.get(name).ok_or_else(|| {
                    Error::conformance(path, format!("missing attribute {:?}", name))
                })?;
                attrs.insert(name.clone(), read_value(elem, aty, &attr_path(path, name))?);
            }
            Ok(Value::Object(attrs))
        }
        Type::Dynamic => {
            let obj = j
                .as_object()
                .filter(|obj| obj.len() == 2 && obj.contains_key("value") && obj.contains_key("type"))
                .ok_or_else(|| {
                    Error::conformance(
                        path,
                        "a dynamic value must be an object with \"value\" and \"type\"",
                    )
                })?;
            let vty = Type::from_spec(&obj["type"])?;
            let value = read_value(&obj["value"], &vty, path)?;
            Ok(Value::Dynamic {
                ty: vty,
                value: Box::new(value),
            })
        }
    }
}
