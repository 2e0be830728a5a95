use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::cast::{FieldPath, FieldType, PathStep, Registry, RegistryError, TypeDescriptor, Value, ValueKind};

/// Limits for structural validation.
#[derive(Debug, Clone)]
pub struct CastOptions {
	/// Maximum nesting depth of records and arrays checked below the root.
	pub max_depth: u32,
}

impl Default for CastOptions {
	fn default() -> Self {
		Self { max_depth: 128 }
	}
}

/// Why a value failed its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
	/// Expected a record.
	NotRecord {
		/// Actual kind.
		found: ValueKind,
	},
	/// Required field is absent.
	MissingField {
		/// Field name.
		field: Box<str>,
	},
	/// Field value has the wrong kind.
	KindMismatch {
		/// Declared field type.
		expected: String,
		/// Actual kind.
		found: ValueKind,
	},
	/// Expected an array.
	NotArray {
		/// Actual kind.
		found: ValueKind,
	},
}

impl fmt::Display for MismatchKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotRecord { found } => write!(f, "expected record, found {found}"),
			Self::MissingField { field } => write!(f, "missing field '{field}'"),
			Self::KindMismatch { expected, found } => write!(f, "expected {expected}, found {found}"),
			Self::NotArray { found } => write!(f, "expected array, found {found}"),
		}
	}
}

/// Structural failure with enough context to explain it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} for '{shape}' at {path}")]
pub struct Mismatch {
	/// Innermost record type whose check failed.
	pub shape: Arc<str>,
	/// Location of the failing record.
	pub record: FieldPath,
	/// Location of the offending value.
	pub path: FieldPath,
	/// Failure reason.
	pub kind: MismatchKind,
}

impl Mismatch {
	/// Whether the failure was found in a record nested below the root.
	pub fn is_nested(&self) -> bool {
		!self.record.is_root()
	}

	/// Re-root both paths under `step`.
	pub fn under(self, step: PathStep) -> Self {
		Self {
			record: self.record.under(step.clone()),
			path: self.path.under(step),
			..self
		}
	}
}

/// Errors from [`validate`].
#[derive(Debug, Error)]
pub enum ValidateError {
	/// The value does not satisfy the descriptor.
	#[error(transparent)]
	Mismatch(#[from] Mismatch),
	/// Nesting exceeded [`CastOptions::max_depth`].
	#[error("validation depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// A nested record could not be described.
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

/// Check `value` against `descriptor`: inclusion, not exact shape.
///
/// Extra record fields are ignored. Nested records are resolved through
/// `registry` only when a value actually reaches them.
pub fn validate(value: &Value, descriptor: &TypeDescriptor, registry: &Registry, options: &CastOptions) -> Result<(), ValidateError> {
	let mut walker = Walker {
		registry,
		options,
		path: Vec::new(),
	};
	walker.record(value, descriptor, 0)
}

struct Walker<'a> {
	registry: &'a Registry,
	options: &'a CastOptions,
	path: Vec<PathStep>,
}

impl Walker<'_> {
	fn record(&mut self, value: &Value, descriptor: &TypeDescriptor, depth: u32) -> Result<(), ValidateError> {
		if depth > self.options.max_depth {
			return Err(ValidateError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let record_len = self.path.len();
		let Some(record) = value.as_record() else {
			return Err(self.mismatch(descriptor, record_len, MismatchKind::NotRecord { found: value.kind() }));
		};

		for (name, ty) in descriptor.fields() {
			let Some(item) = record.get(name) else {
				return Err(self.mismatch(descriptor, record_len, MismatchKind::MissingField { field: name.into() }));
			};
			self.path.push(PathStep::Field(name.into()));
			self.field(item, ty, descriptor, record_len, depth)?;
			self.path.pop();
		}

		Ok(())
	}

	fn field(&mut self, value: &Value, ty: &FieldType, owner: &TypeDescriptor, record_len: usize, depth: u32) -> Result<(), ValidateError> {
		match ty {
			FieldType::Scalar(kind) if kind.accepts(value.kind()) => Ok(()),
			FieldType::Scalar(_) => Err(self.mismatch(
				owner,
				record_len,
				MismatchKind::KindMismatch {
					expected: ty.to_string(),
					found: value.kind(),
				},
			)),
			FieldType::Nested(shape) => {
				let nested = self.registry.resolve(shape)?;
				self.record(value, &nested, depth + 1)
			}
			FieldType::ArrayOf(inner) => {
				let Some(items) = value.as_array() else {
					return Err(self.mismatch(owner, record_len, MismatchKind::NotArray { found: value.kind() }));
				};
				if depth + 1 > self.options.max_depth {
					return Err(ValidateError::DepthExceeded {
						max_depth: self.options.max_depth,
					});
				}
				for (index, item) in items.iter().enumerate() {
					self.path.push(PathStep::Index(index));
					self.field(item, inner, owner, record_len, depth + 1)?;
					self.path.pop();
				}
				Ok(())
			}
		}
	}

	fn mismatch(&self, owner: &TypeDescriptor, record_len: usize, kind: MismatchKind) -> ValidateError {
		ValidateError::Mismatch(Mismatch {
			shape: owner.name().into(),
			record: FieldPath::from(self.path[..record_len].to_vec()),
			path: FieldPath::from(self.path.clone()),
			kind,
		})
	}
}
