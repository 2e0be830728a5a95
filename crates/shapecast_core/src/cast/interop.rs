//! Conversions between the value model and `serde_json`.
//!
//! Integral JSON numbers become [`Value::Int`]; everything else numeric
//! becomes [`Value::Float`], including `u64` values above `i64::MAX`.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cast::{Record, TypedJson, Value};

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(v) => Self::Bool(v),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(v) => Self::Int(v),
				None => n.as_f64().map_or(Self::Null, Self::Float),
			},
			serde_json::Value::String(v) => Self::String(v.into_boxed_str()),
			serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(map) => Self::Record(map.into_iter().map(|(key, item)| (key, Self::from(item))).collect()),
		}
	}
}

impl From<&Value> for serde_json::Value {
	fn from(value: &Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Bool(v) => Self::Bool(*v),
			Value::Int(v) => Self::from(*v),
			Value::Float(v) => serde_json::Number::from_f64(*v).map_or(Self::Null, Self::Number),
			Value::String(v) => Self::String(v.to_string()),
			Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
			Value::Record(record) => Self::Object(record.iter().map(|(key, item)| (key.to_owned(), Self::from(item))).collect()),
		}
	}
}

impl Value {
	/// Parse JSON text into a value, keeping object key order.
	pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
		serde_json::from_str::<serde_json::Value>(input).map(Self::from)
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(v) => serializer.serialize_bool(*v),
			Self::Int(v) => serializer.serialize_i64(*v),
			Self::Float(v) => serializer.serialize_f64(*v),
			Self::String(v) => serializer.serialize_str(v),
			Self::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Record(record) => record.serialize(serializer),
		}
	}
}

impl Serialize for Record {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.len()))?;
		for (key, item) in self.iter() {
			map.serialize_entry(key, item)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		serde_json::Value::deserialize(deserializer).map(Self::from)
	}
}

/// Constrained and unconstrained values serialize identically.
impl Serialize for TypedJson {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.value().serialize(serializer)
	}
}
