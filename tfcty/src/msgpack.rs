//! MessagePack serialization of dynamic values against a type descriptor.
//!
//! Wire conventions: nulls are nil, unknown values are extension values
//! (code 0, or code 12 when the producer attached refinements), and a typed
//! value in a dynamically-typed slot is a two-element array of its JSON type
//! specification followed by the value itself.

use std::collections::BTreeMap;

use rmp::{encode, Marker};
use serde_json::Number;

use crate::error::{attr_path, elem_path};
use crate::value::parse_number;
use crate::{Error, Result, Type, Value};

const FORMAT: &str = "msgpack";

/// Extension code for an unknown value without refinements.
const EXT_UNKNOWN: i8 = 0;

/// Serialize `value` against `ty`.
pub fn marshal(value: &Value, ty: &Type) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_value(value, ty, "", &mut buf)?;
    Ok(buf)
}

/// Deserialize a value of type `ty` from `src`.
pub fn unmarshal(src: &[u8], ty: &Type) -> Result<Value> {
    let mut r = Reader::new(src);
    read_value(&mut r, ty, "")
}

fn write_value(value: &Value, ty: &Type, path: &str, buf: &mut Vec<u8>) -> Result<()> {
    // A typed value in a dynamic slot is written as a [type, value] pair;
    // dynamic nulls and unknowns are written as the bare markers below.
    if let (Type::Dynamic, Value::Dynamic { ty: vty, value }) = (ty, value) {
        encode::write_array_len(buf, 2).map_err(enc_err)?;
        encode::write_bin(buf, &vty.to_json()).map_err(enc_err)?;
        return write_value(value.as_ref(), vty, path, buf);
    }
    match (ty, value) {
        (_, Value::Unknown) => {
            encode::write_ext_meta(buf, 1, EXT_UNKNOWN).map_err(enc_err)?;
            buf.push(0);
            Ok(())
        }
        (_, Value::Null) => {
            encode::write_nil(buf).map_err(enc_err)?;
            Ok(())
        }
        (Type::Bool, Value::Bool(b)) => {
            encode::write_bool(buf, *b).map_err(enc_err)?;
            Ok(())
        }
        (Type::Number, Value::Number(n)) => write_number(n, path, buf),
        (Type::String, Value::String(s)) => {
            encode::write_str(buf, s).map_err(enc_err)?;
            Ok(())
        }
        (Type::List(ety) | Type::Set(ety), Value::List(items)) => {
            encode::write_array_len(buf, items.len() as u32).map_err(enc_err)?;
            for (i, item) in items.iter().enumerate() {
                write_value(item, ety.as_ref(), &elem_path(path, i), buf)?;
            }
            Ok(())
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
            encode::write_array_len(buf, items.len() as u32).map_err(enc_err)?;
            for (i, (item, ety)) in items.iter().zip(etys).enumerate() {
                write_value(item, ety, &elem_path(path, i), buf)?;
            }
            Ok(())
        }
        (Type::Map(ety), Value::Object(entries)) => {
            encode::write_map_len(buf, entries.len() as u32).map_err(enc_err)?;
            for (key, item) in entries {
                encode::write_str(buf, key).map_err(enc_err)?;
                write_value(item, ety.as_ref(), &attr_path(path, key), buf)?;
            }
            Ok(())
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
            encode::write_map_len(buf, atys.len() as u32).map_err(enc_err)?;
            for (name, aty) in atys {
                let item = attrs.get(name).ok_or_else(|| {
                    Error::conformance(path, format!("missing attribute {:?}", name))
                })?;
                encode::write_str(buf, name).map_err(enc_err)?;
                write_value(item, aty, &attr_path(path, name), buf)?;
            }
            Ok(())
        }
        _ => Err(Error::conformance(
            path,
            "value does not conform to the schema type",
        )),
    }
}

fn write_number(n: &Number, path: &str, buf: &mut Vec<u8>) -> Result<()> {
    if let Some(v) = n.as_i64() {
        encode::write_sint(buf, v).map_err(enc_err)?;
    } else if let Some(v) = n.as_u64() {
        encode::write_uint(buf, v).map_err(enc_err)?;
    } else if let Some(v) = n.as_f64() {
        encode::write_f64(buf, v).map_err(enc_err)?;
    } else {
        return Err(Error::conformance(path, "unrepresentable number"));
    }
    Ok(())
}

fn enc_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Encode {
        format: FORMAT,
        detail: e.to_string(),
    }
}

fn read_value(r: &mut Reader, ty: &Type, path: &str) -> Result<Value> {
    let marker = Marker::from_u8(r.byte()?);
    match marker {
        Marker::Null => return Ok(Value::Null),
        Marker::FixExt1
        | Marker::FixExt2
        | Marker::FixExt4
        | Marker::FixExt8
        | Marker::FixExt16
        | Marker::Ext8
        | Marker::Ext16
        | Marker::Ext32 => {
            // Any extension value marks an unknown; refinement payloads
            // (code 12) are discarded.
            skip_ext(r, marker)?;
            return Ok(Value::Unknown);
        }
        _ => {}
    }
    match ty {
        Type::Bool => match marker {
            Marker::True => Ok(Value::Bool(true)),
            Marker::False => Ok(Value::Bool(false)),
            _ => Err(Error::conformance(path, "a bool is required")),
        },
        Type::Number => read_number(r, marker, path),
        Type::String => Ok(Value::String(read_str(r, marker, path)?)),
        Type::List(ety) | Type::Set(ety) => {
            let n = read_array_len(r, marker, path)?;
            let mut items = Vec::with_capacity(n.min(1024));
            for i in 0..n {
                items.push(read_value(r, ety.as_ref(), &elem_path(path, i))?);
            }
            Ok(Value::List(items))
        }
        Type::Tuple(etys) => {
            let n = read_array_len(r, marker, path)?;
            if n != etys.len() {
                return Err(Error::conformance(
                    path,
                    format!("a tuple of {} elements is required ({} given)", etys.len(), n),
                ));
            }
            let mut items = Vec::with_capacity(n);
            for (i, ety) in etys.iter().enumerate() {
                items.push(read_value(r, ety, &elem_path(path, i))?);
            }
            Ok(Value::List(items))
        }
        Type::Map(ety) => {
            let n = read_map_len(r, marker, path)?;
            let mut entries = BTreeMap::new();
            for _ in 0..n {
                let key_marker = Marker::from_u8(r.byte()?);
                let key = read_str(r, key_marker, path)?;
                let item = read_value(r, ety.as_ref(), &attr_path(path, &key))?;
                entries.insert(key, item);
            }
            Ok(Value::Object(entries))
        }
        Type::Object(atys) => {
            let n = read_map_len(r, marker, path)?;
            if n != atys.len() {
                return Err(Error::conformance(
                    path,
                    format!(
                        "an object with {} attributes is required ({} given)",
                        atys.len(),
                        n
                    ),
                ));
            }
            let mut attrs = BTreeMap::new();
            for _ in 0..n {
                let key_marker = Marker::from_u8(r.byte()?);
                let key = read_str(r, key_marker, path)?;
                let aty = atys.get(&key).ok_or_else(|| {
                    Error::conformance(path, format!("unsupported attribute {:?}", key))
                })?;
                let item = read_value(r, aty, &attr_path(path, &key))?;
                attrs.insert(key, item);
            }
            Ok(Value::Object(attrs))
        }
        Type::Dynamic => read_dynamic(r, marker, path),
    }
}

/// A typed value in a dynamic slot: `[type specification, value]`.
fn read_dynamic(r: &mut Reader, marker: Marker, path: &str) -> Result<Value> {
    let n = read_array_len(r, marker, path)
        .map_err(|_| Error::conformance(path, "a dynamically-typed value is required"))?;
    if n != 2 {
        return Err(Error::conformance(
            path,
            "dynamic value must be a two-element array of type and value",
        ));
    }
    let spec_marker = Marker::from_u8(r.byte()?);
    let spec = read_blob(r, spec_marker, path)?;
    let ty = Type::from_json(spec)?;
    let value = read_value(r, &ty, path)?;
    Ok(Value::Dynamic {
        ty,
        value: Box::new(value),
    })
}

fn read_number(r: &mut Reader, marker: Marker, path: &str) -> Result<Value> {
    let n = match marker {
        Marker::FixPos(v) => Number::from(v),
        Marker::FixNeg(v) => Number::from(v),
        Marker::U8 => Number::from(r.byte()?),
        Marker::U16 => Number::from(r.u16()?),
        Marker::U32 => Number::from(r.u32()?),
        Marker::U64 => Number::from(r.u64()?),
        Marker::I8 => Number::from(r.byte()? as i8),
        Marker::I16 => Number::from(r.u16()? as i16),
        Marker::I32 => Number::from(r.u32()? as i32),
        Marker::I64 => Number::from(r.u64()? as i64),
        Marker::F32 => float_number(r.f32()? as f64, path)?,
        Marker::F64 => float_number(r.f64()?, path)?,
        // Big numbers travel as decimal strings.
        Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => {
            let s = read_str(r, marker, path)?;
            parse_number(&s)
                .ok_or_else(|| Error::conformance(path, format!("invalid number {:?}", s)))?
        }
        _ => return Err(Error::conformance(path, "a number is required")),
    };
    Ok(Value::Number(n))
}

fn float_number(v: f64, path: &str) -> Result<Number> {
    Number::from_f64(v).ok_or_else(|| Error::conformance(path, "a finite number is required"))
}

fn read_str(r: &mut Reader, marker: Marker, path: &str) -> Result<String> {
    let len = match marker {
        Marker::FixStr(l) => l as usize,
        Marker::Str8 => r.byte()? as usize,
        Marker::Str16 => r.u16()? as usize,
        Marker::Str32 => r.u32()? as usize,
        _ => return Err(Error::conformance(path, "a string is required")),
    };
    let bytes = r.take(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| Error::malformed(FORMAT, "invalid utf-8 in string"))
}

/// String or binary payload; type specifications are written as binary but
/// some producers use the string family.
fn read_blob<'a>(r: &mut Reader<'a>, marker: Marker, path: &str) -> Result<&'a [u8]> {
    let len = match marker {
        Marker::FixStr(l) => l as usize,
        Marker::Str8 | Marker::Bin8 => r.byte()? as usize,
        Marker::Str16 | Marker::Bin16 => r.u16()? as usize,
        Marker::Str32 | Marker::Bin32 => r.u32()? as usize,
        _ => {
            return Err(Error::conformance(
                path,
                "a type specification string is required",
            ))
        }
    };
    r.take(len)
}

fn read_array_len(r: &mut Reader, marker: Marker, path: &str) -> Result<usize> {
    match marker {
        Marker::FixArray(n) => Ok(n as usize),
        Marker::Array16 => Ok(r.u16()? as usize),
        Marker::Array32 => Ok(r.u32()? as usize),
        _ => Err(Error::conformance(path, "an array is required")),
    }
}

fn read_map_len(r: &mut Reader, marker: Marker, path: &str) -> Result<usize> {
    match marker {
        Marker::FixMap(n) => Ok(n as usize),
        Marker::Map16 => Ok(r.u16()? as usize),
        Marker::Map32 => Ok(r.u32()? as usize),
        _ => Err(Error::conformance(path, "a map is required")),
    }
}

fn skip_ext(r: &mut Reader, marker: Marker) -> Result<()> {
    let len = match marker {
        Marker::FixExt1 => 1,
        Marker::FixExt2 => 2,
        Marker::FixExt4 => 4,
        Marker::FixExt8 => 8,
        Marker::FixExt16 => 16,
        Marker::Ext8 => r.byte()? as usize,
        Marker::Ext16 => r.u16()? as usize,
        Marker::Ext32 => r.u32()? as usize,
        _ => 0,
    };
    let _code = r.byte()?;
    r.take(len)?;
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() - self.pos < n {
            return Err(Error::malformed(FORMAT, "unexpected end of input"));
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.u32()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.u64()?))
    }
}
