use std::fmt;
use std::sync::Arc;

use crate::cast::{FieldType, Registry, RegistryError, TypeDescriptor, TypeExpr};

/// Static type tag carried by a dynamic value.
#[derive(Debug, Clone, Default)]
pub enum JsonType {
	/// Unconstrained `json`.
	#[default]
	Json,
	/// `json<T>`: validated against record `T`.
	Constrained(Arc<TypeDescriptor>),
	/// `X[]`.
	Array(Box<JsonType>),
}

impl JsonType {
	/// `json<T>` for `descriptor`.
	pub fn constrained(descriptor: Arc<TypeDescriptor>) -> Self {
		Self::Constrained(descriptor)
	}

	/// Array of this type.
	pub fn array_of(self) -> Self {
		Self::Array(Box::new(self))
	}

	/// Record constraint, if any.
	pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
		match self {
			Self::Constrained(descriptor) => Some(descriptor),
			_ => None,
		}
	}

	/// Element type of an array type.
	pub fn element(&self) -> Option<&JsonType> {
		match self {
			Self::Array(inner) => Some(inner),
			_ => None,
		}
	}

	/// Static type of a field declared as `ty`. Scalars stay plain `json`.
	pub fn of_field(ty: &FieldType, registry: &Registry) -> Result<Self, RegistryError> {
		Ok(match ty {
			FieldType::Scalar(_) => Self::Json,
			FieldType::Nested(shape) => Self::Constrained(registry.resolve(shape)?),
			FieldType::ArrayOf(inner) => Self::of_field(inner, registry)?.array_of(),
		})
	}

	/// Cast target named by a type expression: `json`, `Person`, `Person[]`.
	pub fn from_expr(expr: &TypeExpr, registry: &Registry) -> Result<Self, RegistryError> {
		match expr {
			TypeExpr::Named(name) if name.as_ref() == "json" => Ok(Self::Json),
			TypeExpr::Named(name) => Ok(Self::Constrained(registry.describe(name)?)),
			TypeExpr::Array(inner) => Ok(Self::from_expr(inner, registry)?.array_of()),
			TypeExpr::Scalar(_) => Err(RegistryError::ScalarTarget { expr: expr.to_string() }),
		}
	}
}

/// Types compare by record identity, not by descriptor allocation.
impl PartialEq for JsonType {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Json, Self::Json) => true,
			(Self::Constrained(left), Self::Constrained(right)) => left.name() == right.name(),
			(Self::Array(left), Self::Array(right)) => left == right,
			_ => false,
		}
	}
}

impl Eq for JsonType {}

impl fmt::Display for JsonType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Json => f.write_str("json"),
			Self::Constrained(descriptor) => write!(f, "json<{}>", descriptor.name()),
			Self::Array(inner) => write!(f, "{inner}[]"),
		}
	}
}
