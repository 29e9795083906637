//! `serde` serializer that builds recorded argument values.
//!
//! The output follows `serde_json::to_value` except where that would give two
//! different inputs the same value:
//!
//! - non-finite floats become `{"$float": "NaN"}`, `{"$float": "inf"}` or
//!   `{"$float": "-inf"}` instead of `null`;
//! - integers outside the 64-bit range become `{"$int": "<digits>"}`;
//! - map keys that are not strings are keyed by their compact JSON text
//!   (`{(1, 2): x}` records as `{"[1,2]": x}`).

use serde::ser::{self, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

pub const FLOAT_TAG: &str = "$float";
pub const INT_TAG: &str = "$int";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct CaptureError(String);

impl ser::Error for CaptureError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

pub fn capture<T: Serialize + ?Sized>(value: &T) -> Result<Value, CaptureError> {
    value.serialize(ValueCapture)
}

/// A one-entry object `{tag: text}`.
pub(crate) fn tagged(tag: &str, text: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert(tag.to_string(), Value::String(text.into()));
    Value::Object(map)
}

fn float(value: f64) -> Value {
    if value.is_nan() {
        tagged(FLOAT_TAG, "NaN")
    } else if value.is_infinite() {
        tagged(FLOAT_TAG, if value > 0.0 { "inf" } else { "-inf" })
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn wide_int(digits: String) -> Value {
    tagged(INT_TAG, digits)
}

fn map_key(key: Value) -> String {
    match key {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

struct ValueCapture;

impl Serializer for ValueCapture {
    type Ok = Value;
    type Error = CaptureError;
    type SerializeSeq = SeqCapture;
    type SerializeTuple = SeqCapture;
    type SerializeTupleStruct = SeqCapture;
    type SerializeTupleVariant = TupleVariantCapture;
    type SerializeMap = MapCapture;
    type SerializeStruct = MapCapture;
    type SerializeStructVariant = StructVariantCapture;

    fn serialize_bool(self, v: bool) -> Result<Value, CaptureError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CaptureError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CaptureError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CaptureError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CaptureError> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, CaptureError> {
        if let Ok(n) = i64::try_from(v) {
            return Ok(Value::from(n));
        }
        if let Ok(n) = u64::try_from(v) {
            return Ok(Value::from(n));
        }
        Ok(wide_int(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CaptureError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CaptureError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CaptureError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CaptureError> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, CaptureError> {
        match u64::try_from(v) {
            Ok(n) => Ok(Value::from(n)),
            Err(_) => Ok(wide_int(v.to_string())),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CaptureError> {
        if v.is_finite() {
            Ok(Value::from(v))
        } else {
            Ok(float(f64::from(v)))
        }
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CaptureError> {
        Ok(float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, CaptureError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CaptureError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CaptureError> {
        Ok(Value::Array(v.iter().map(|b| Value::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<Value, CaptureError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, CaptureError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, CaptureError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CaptureError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, CaptureError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, CaptureError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CaptureError> {
        Ok(single_entry(variant, capture(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCapture, CaptureError> {
        Ok(SeqCapture {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantCapture, CaptureError> {
        Ok(TupleVariantCapture {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapCapture, CaptureError> {
        Ok(MapCapture {
            entries: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapCapture, CaptureError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantCapture, CaptureError> {
        Ok(StructVariantCapture {
            variant,
            entries: Map::new(),
        })
    }
}

struct SeqCapture {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.items.push(capture(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CaptureError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, CaptureError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, CaptureError> {
        ser::SerializeSeq::end(self)
    }
}

struct TupleVariantCapture {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.items.push(capture(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CaptureError> {
        Ok(single_entry(self.variant, Value::Array(self.items)))
    }
}

struct MapCapture {
    entries: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), CaptureError> {
        self.next_key = Some(map_key(capture(key)?));
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| CaptureError("map value serialized before its key".to_string()))?;
        self.entries.insert(key, capture(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CaptureError> {
        Ok(Value::Object(self.entries))
    }
}

impl ser::SerializeStruct for MapCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.entries.insert(key.to_string(), capture(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CaptureError> {
        Ok(Value::Object(self.entries))
    }
}

struct StructVariantCapture {
    variant: &'static str,
    entries: Map<String, Value>,
}

impl ser::SerializeStructVariant for StructVariantCapture {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.entries.insert(key.to_string(), capture(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CaptureError> {
        Ok(single_entry(self.variant, Value::Object(self.entries)))
    }
}
