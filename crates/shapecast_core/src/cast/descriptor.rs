use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::cast::{RecordDecl, RegistryError, ScalarKind, TypeExpr};

/// Identity of a record shape. Resolved through a [`crate::cast::Registry`]
/// when needed, so self-referential records never expand eagerly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeRef(Arc<str>);

impl ShapeRef {
	/// Reference a record by name.
	pub fn new(name: &str) -> Self {
		Self(name.into())
	}

	/// Referenced record name.
	pub fn name(&self) -> &str {
		&self.0
	}
}

/// Resolved field type inside a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
	/// Exact primitive kind.
	Scalar(ScalarKind),
	/// Nested record.
	Nested(ShapeRef),
	/// Every element must satisfy the inner type.
	ArrayOf(Box<FieldType>),
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(kind) => f.write_str(kind.as_str()),
			Self::Nested(shape) => f.write_str(shape.name()),
			Self::ArrayOf(inner) => write!(f, "{inner}[]"),
		}
	}
}

/// Structural metadata for one record type: required field names and types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	name: Arc<str>,
	fields: IndexMap<Box<str>, FieldType>,
}

impl TypeDescriptor {
	/// Build from a declaration. `is_declared` answers whether a referenced
	/// record name is known; referenced records are not described here.
	pub(crate) fn build(decl: &RecordDecl, is_declared: impl Fn(&str) -> bool) -> Result<Self, RegistryError> {
		if decl.name.is_empty() {
			return Err(RegistryError::EmptyName { context: "record" });
		}

		let mut fields = IndexMap::with_capacity(decl.fields.len());
		for field in &decl.fields {
			if field.name.is_empty() {
				return Err(RegistryError::EmptyName { context: "field" });
			}
			let ty = resolve(&decl.name, &field.name, &field.ty, &is_declared)?;
			if fields.insert(field.name.clone(), ty).is_some() {
				return Err(RegistryError::DuplicateField {
					shape: decl.name.to_string(),
					field: field.name.to_string(),
				});
			}
		}

		Ok(Self {
			name: decl.name.as_ref().into(),
			fields,
		})
	}

	/// Record name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Identity handle for this record.
	pub fn shape_ref(&self) -> ShapeRef {
		ShapeRef(self.name.clone())
	}

	/// Declared field type by name.
	pub fn field(&self, name: &str) -> Option<&FieldType> {
		self.fields.get(name)
	}

	/// Fields in declaration order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
		self.fields.iter().map(|(name, ty)| (name.as_ref(), ty))
	}

	/// Number of required fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the record requires no fields at all.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

fn resolve(shape: &str, field: &str, expr: &TypeExpr, is_declared: &impl Fn(&str) -> bool) -> Result<FieldType, RegistryError> {
	match expr {
		TypeExpr::Scalar(kind) => Ok(FieldType::Scalar(*kind)),
		TypeExpr::Named(name) if name.as_ref() == shape || is_declared(name) => Ok(FieldType::Nested(ShapeRef::new(name))),
		TypeExpr::Named(name) => Err(RegistryError::UndeclaredReference {
			shape: shape.to_owned(),
			field: field.to_owned(),
			target: name.to_string(),
		}),
		TypeExpr::Array(inner) => Ok(FieldType::ArrayOf(Box::new(resolve(shape, field, inner, is_declared)?))),
	}
}
