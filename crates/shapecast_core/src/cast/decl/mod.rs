use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::cast::{RegistryError, ValueKind};

/// Primitive kinds a record field can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	/// `boolean`.
	Bool,
	/// `int`.
	Int,
	/// `float`.
	Float,
	/// `string`.
	String,
}

impl ScalarKind {
	/// Resolve a scalar type keyword.
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"bool" | "boolean" => Some(Self::Bool),
			"int" => Some(Self::Int),
			"float" => Some(Self::Float),
			"string" => Some(Self::String),
			_ => None,
		}
	}

	/// Canonical keyword.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "boolean",
			Self::Int => "int",
			Self::Float => "float",
			Self::String => "string",
		}
	}

	/// Exact kind match; `int` and `float` never widen into each other.
	pub fn accepts(self, kind: ValueKind) -> bool {
		matches!(
			(self, kind),
			(Self::Bool, ValueKind::Bool) | (Self::Int, ValueKind::Int) | (Self::Float, ValueKind::Float) | (Self::String, ValueKind::String)
		)
	}
}

/// Declared field type, before record names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
	/// Primitive kind.
	Scalar(ScalarKind),
	/// Record referenced by name.
	Named(Box<str>),
	/// Array of the inner type.
	Array(Box<TypeExpr>),
}

impl TypeExpr {
	/// Record reference.
	pub fn named(name: &str) -> Self {
		Self::Named(name.into())
	}

	/// Array of `inner`.
	pub fn array(inner: TypeExpr) -> Self {
		Self::Array(Box::new(inner))
	}

	/// Parse `int`, `Person`, `pkg:Person`, `Student[]`, `int[][]`.
	pub fn parse(input: &str) -> Result<Self, RegistryError> {
		let invalid = || RegistryError::InvalidTypeExpr { expr: input.to_owned() };
		let trimmed = input.trim();
		let bytes = trimmed.as_bytes();

		let mut end = 0_usize;
		while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b':') {
			end += 1;
		}
		if end == 0 || bytes[0].is_ascii_digit() {
			return Err(invalid());
		}

		let ident = &trimmed[..end];
		let mut out = match ScalarKind::from_name(ident) {
			Some(kind) => Self::Scalar(kind),
			None => Self::named(ident),
		};

		let mut rest = trimmed[end..].trim_start();
		while !rest.is_empty() {
			let Some(after) = rest.strip_prefix("[]") else {
				return Err(invalid());
			};
			out = Self::array(out);
			rest = after.trim_start();
		}

		Ok(out)
	}
}

impl fmt::Display for TypeExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(kind) => f.write_str(kind.as_str()),
			Self::Named(name) => f.write_str(name),
			Self::Array(inner) => write!(f, "{inner}[]"),
		}
	}
}

/// One declared record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
	/// Field name.
	pub name: Box<str>,
	/// Declared type.
	pub ty: TypeExpr,
}

/// Declared record shape: the introspection source for descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
	/// Record name.
	pub name: Box<str>,
	/// Fields in declaration order.
	pub fields: Vec<FieldDecl>,
}

impl RecordDecl {
	/// Start a declaration with no fields.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Append a field.
	pub fn field(mut self, name: &str, ty: TypeExpr) -> Self {
		self.fields.push(FieldDecl { name: name.into(), ty });
		self
	}

	/// Append a field from type expression text.
	pub fn field_expr(self, name: &str, expr: &str) -> Result<Self, RegistryError> {
		Ok(self.field(name, TypeExpr::parse(expr)?))
	}
}

/// Native Rust types that publish a record shape.
///
/// Records the shape refers to by name must be declared in the same
/// registry before the shape is described.
pub trait Shape {
	/// Declaration for this type.
	fn declare() -> RecordDecl;
}

/// JSON shape file: record name -> field name -> type expression.
///
/// ```json
/// { "records": { "Person": { "name": "string", "age": "int" } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShapeFile {
	/// Records in file order, fields in file order.
	pub records: IndexMap<String, ShapeFields>,
}

/// Fields of one shape file record as written, repeated names included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeFields(pub Vec<(String, String)>);

impl ShapeFields {
	/// Field name and type expression pairs in file order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, expr)| (name.as_str(), expr.as_str()))
	}

	/// Number of entries, repeats counted.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the record lists no fields.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<'de> Deserialize<'de> for ShapeFields {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct EntriesVisitor;

		impl<'de> Visitor<'de> for EntriesVisitor {
			type Value = ShapeFields;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a map of field names to type expressions")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
				let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some(entry) = map.next_entry::<String, String>()? {
					entries.push(entry);
				}
				Ok(ShapeFields(entries))
			}
		}

		deserializer.deserialize_map(EntriesVisitor)
	}
}

impl ShapeFile {
	/// Parse shape file text.
	pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
		serde_json::from_str(input)
	}

	/// Convert to declarations, parsing every type expression.
	pub fn to_decls(&self) -> Result<Vec<RecordDecl>, RegistryError> {
		self.records
			.iter()
			.map(|(name, fields)| {
				fields
					.iter()
					.try_fold(RecordDecl::new(name), |decl, (field, expr)| decl.field_expr(field, expr))
			})
			.collect()
	}
}
