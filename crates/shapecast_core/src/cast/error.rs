use thiserror::Error;

use crate::cast::{Mismatch, ValueKind};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Umbrella error for callers mixing registry, cast, and materialize work.
#[derive(Debug, Error)]
pub enum ShapeError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Input document was not valid JSON.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Record declaration or lookup failure.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// Structural cast failure.
	#[error(transparent)]
	Cast(#[from] CastError),
	/// Native materialization failure.
	#[error(transparent)]
	Materialize(#[from] MaterializeError),
	/// Path expression syntax is invalid.
	#[error("invalid field path: {path}")]
	InvalidFieldPath {
		/// Original user-provided path string.
		path: String,
	},
	/// Path expression did not select a value.
	#[error("field path not found: {path}")]
	FieldPathNotFound {
		/// Path that failed to resolve.
		path: String,
	},
}

/// Errors produced while declaring and describing record shapes.
///
/// These indicate a malformed declaration rather than bad runtime data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// No declaration exists for the requested record.
	#[error("unknown record shape: {name}")]
	UnknownShape {
		/// Requested record name.
		name: String,
	},
	/// A field refers to a record that has not been declared.
	#[error("field '{field}' of '{shape}' refers to undeclared record '{target}'")]
	UndeclaredReference {
		/// Declaring record.
		shape: String,
		/// Offending field.
		field: String,
		/// Referenced record name.
		target: String,
	},
	/// A record declares the same field twice.
	#[error("duplicate field '{field}' in record '{shape}'")]
	DuplicateField {
		/// Declaring record.
		shape: String,
		/// Duplicated field name.
		field: String,
	},
	/// A record or field name was empty.
	#[error("empty {context} name")]
	EmptyName {
		/// What kind of name was empty.
		context: &'static str,
	},
	/// A different declaration is already published under this name.
	#[error("conflicting declaration for record '{name}'")]
	Conflict {
		/// Record name.
		name: String,
	},
	/// Type expression text could not be parsed.
	#[error("invalid type expression: {expr}")]
	InvalidTypeExpr {
		/// Original expression text.
		expr: String,
	},
	/// Scalar types cannot be used as a cast target.
	#[error("'{expr}' is not a json cast target")]
	ScalarTarget {
		/// Original expression text.
		expr: String,
	},
}

/// Errors returned by structural casts.
#[derive(Debug, Clone, Error)]
pub enum CastError {
	/// The value does not satisfy the target shape.
	#[error("'{from}' cannot be cast to '{to}'")]
	Incompatible {
		/// Static type name of the source value.
		from: String,
		/// Static type name of the cast target.
		to: String,
		/// Structural detail, absent when the target has no record shape.
		mismatch: Option<Mismatch>,
	},
	/// Validation recursed past the configured depth.
	#[error("cast depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// A nested record shape could not be resolved.
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

impl CastError {
	/// Human-readable reason, as surfaced to the running program.
	pub fn reason(&self) -> String {
		self.to_string()
	}

	/// Structural detail behind an incompatible cast.
	pub fn mismatch(&self) -> Option<&Mismatch> {
		match self {
			Self::Incompatible { mismatch, .. } => mismatch.as_ref(),
			_ => None,
		}
	}
}

/// Errors produced while building native instances.
///
/// Any of these aborts the whole materialization call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterializeError {
	/// Input was not a record.
	#[error("cannot materialize '{type_name}' from {found}")]
	NotRecord {
		/// Target type label.
		type_name: String,
		/// Runtime kind of the input.
		found: ValueKind,
	},
	/// Field value kind cannot be coerced to the declared type.
	#[error("field '{field}' of '{type_name}': expected {expected}, found {found}")]
	FieldType {
		/// Declaring type label.
		type_name: String,
		/// Field name.
		field: String,
		/// Declared native type.
		expected: String,
		/// Runtime kind of the input.
		found: ValueKind,
	},
	/// Numeric value does not fit the declared width.
	#[error("field '{field}' of '{type_name}': value {value} does not fit {target}")]
	Overflow {
		/// Declaring type label.
		type_name: String,
		/// Field name.
		field: String,
		/// Rendered input value.
		value: String,
		/// Declared native type.
		target: String,
	},
	/// Constructor requested a field that was not collected.
	#[error("field '{field}' is not materialized for '{type_name}'")]
	UndeclaredField {
		/// Declaring type label.
		type_name: String,
		/// Field name.
		field: String,
	},
	/// Constructor read a field through an accessor of the wrong type.
	#[error("field '{field}' of '{type_name}' holds {found}, read as {expected}")]
	AccessorType {
		/// Declaring type label.
		type_name: String,
		/// Field name.
		field: String,
		/// Requested Rust type label.
		expected: String,
		/// Collected native kind.
		found: &'static str,
	},
	/// Field table declares the same field twice at one hierarchy depth.
	#[error("duplicate field '{field}' at depth {depth} in '{type_name}'")]
	DuplicateField {
		/// Declaring type label.
		type_name: String,
		/// Field name.
		field: String,
		/// Hierarchy depth of both declarations.
		depth: u32,
	},
	/// Constructor asked for a base level the field table does not have.
	#[error("'{type_name}' has no base fields")]
	MissingBase {
		/// Declaring type label.
		type_name: String,
	},
	/// Nested records recursed past the configured depth.
	#[error("materialize depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
}
