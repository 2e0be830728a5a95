use std::fmt;

use indexmap::IndexMap;

/// Runtime kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// `null`.
	Null,
	/// `true` / `false`.
	Bool,
	/// 64-bit signed integer.
	Int,
	/// Double-precision float.
	Float,
	/// UTF-8 string.
	String,
	/// Ordered element sequence.
	Array,
	/// Ordered field map.
	Record,
}

impl ValueKind {
	/// Language-level name of this kind.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool => "boolean",
			Self::Int => "int",
			Self::Float => "float",
			Self::String => "string",
			Self::Array => "array",
			Self::Record => "record",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Dynamic JSON-like runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// `null`.
	Null,
	/// Boolean.
	Bool(bool),
	/// Every integral number, as produced by the reader.
	Int(i64),
	/// Every non-integral number.
	Float(f64),
	/// UTF-8 string.
	String(Box<str>),
	/// Elements may be of mixed kinds.
	Array(Vec<Value>),
	/// Open record.
	Record(Record),
}

/// Open record whose fields keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
	fields: IndexMap<Box<str>, Value>,
}

impl Record {
	/// Create an empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a field and return the record, for literal-style construction.
	pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	/// Insert or replace a field. Replacing keeps the original position.
	pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
		self.fields.insert(name.into(), value.into())
	}

	/// Look up a field by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}

	/// Look up a field by name for in-place replacement.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.fields.get_mut(name)
	}

	/// Remove a field, keeping the order of the remaining ones.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.fields.shift_remove(name)
	}

	/// Whether the record carries `name`.
	pub fn contains_key(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the record has no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Field names in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(AsRef::as_ref)
	}

	/// Fields in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.fields.iter().map(|(name, value)| (name.as_ref(), value))
	}
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut out = Self::new();
		for (name, value) in iter {
			out.insert(name.as_ref(), value);
		}
		out
	}
}

impl Value {
	/// Runtime kind tag.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null => ValueKind::Null,
			Self::Bool(_) => ValueKind::Bool,
			Self::Int(_) => ValueKind::Int,
			Self::Float(_) => ValueKind::Float,
			Self::String(_) => ValueKind::String,
			Self::Array(_) => ValueKind::Array,
			Self::Record(_) => ValueKind::Record,
		}
	}

	/// Build a record value from `(name, value)` pairs.
	pub fn record<K: AsRef<str>, V: Into<Value>>(fields: impl IntoIterator<Item = (K, V)>) -> Self {
		Self::Record(fields.into_iter().collect())
	}

	/// Whether this is `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Integer payload.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Float payload.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(v) => Some(v),
			_ => None,
		}
	}

	/// Array elements.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Mutable array elements.
	pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Record payload.
	pub fn as_record(&self) -> Option<&Record> {
		match self {
			Self::Record(item) => Some(item),
			_ => None,
		}
	}

	/// Mutable record payload.
	pub fn as_record_mut(&mut self) -> Option<&mut Record> {
		match self {
			Self::Record(item) => Some(item),
			_ => None,
		}
	}

	/// Field lookup on a record value.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.as_record().and_then(|item| item.get(name))
	}

	/// Element lookup on an array value.
	pub fn index(&self, index: usize) -> Option<&Value> {
		self.as_array().and_then(|items| items.get(index))
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value.into_boxed_str())
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Array(value)
	}
}

impl From<Record> for Value {
	fn from(value: Record) -> Self {
		Self::Record(value)
	}
}

/// Runtime display form: `{"name":"John Doe", "age":30}`.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Float(v) => write_float(f, *v),
			Self::String(v) => write_quoted(f, v),
			Self::Array(items) => {
				f.write_str("[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Self::Record(item) => write!(f, "{item}"),
		}
	}
}

impl fmt::Display for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("{")?;
		for (idx, (name, value)) in self.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			write_quoted(f, name)?;
			write!(f, ":{value}")?;
		}
		f.write_str("}")
	}
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
	if value.is_finite() && value.fract() == 0.0 {
		write!(f, "{value:.1}")
	} else {
		write!(f, "{value}")
	}
}

fn write_quoted(f: &mut fmt::Formatter<'_>, input: &str) -> fmt::Result {
	f.write_str("\"")?;
	for ch in input.chars() {
		match ch {
			'"' => f.write_str("\\\"")?,
			'\\' => f.write_str("\\\\")?,
			'\n' => f.write_str("\\n")?,
			'\r' => f.write_str("\\r")?,
			'\t' => f.write_str("\\t")?,
			c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
			c => write!(f, "{c}")?,
		}
	}
	f.write_str("\"")
}

#[cfg(test)]
mod tests;
