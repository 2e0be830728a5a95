use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cast::{
	CastError, CastOptions, FieldPath, JsonType, Mismatch, MismatchKind, PathStep, Registry, RegistryError, TypeDescriptor, ValidateError, Value,
	validate,
};

/// Dynamic value paired with its static type tag.
///
/// Casting never touches the payload: a successful cast returns a new tag
/// over the same shared [`Value`].
#[derive(Debug, Clone)]
pub struct TypedJson {
	ty: JsonType,
	value: Arc<Value>,
}

impl TypedJson {
	/// Wrap an unconstrained value.
	pub fn new(value: Value) -> Self {
		Self {
			ty: JsonType::Json,
			value: Arc::new(value),
		}
	}

	/// Tag an already shared payload. No validation happens here.
	pub fn from_shared(value: Arc<Value>, ty: JsonType) -> Self {
		Self { ty, value }
	}

	/// Static type tag.
	pub fn ty(&self) -> &JsonType {
		&self.ty
	}

	/// Payload.
	pub fn value(&self) -> &Value {
		&self.value
	}

	/// Shared payload handle.
	pub fn shared(&self) -> &Arc<Value> {
		&self.value
	}

	/// Take the payload, cloning only if it is still shared.
	pub fn into_value(self) -> Value {
		Arc::unwrap_or_clone(self.value)
	}

	/// Whether both values alias one payload.
	pub fn shares_payload(&self, other: &TypedJson) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}

	/// Record keys in insertion order; empty for non-records.
	pub fn keys(&self) -> Vec<&str> {
		self.value.as_record().map(|record| record.keys().collect()).unwrap_or_default()
	}

	/// Read a record field, tagged with the field's declared static type.
	///
	/// On `json<T>`, a field declared as record `U` comes back as `json<U>`
	/// and an array of `U` as `json<U>[]`. Undeclared and scalar fields are
	/// plain `json`. Returns `None` when the field is absent.
	pub fn field(&self, name: &str, registry: &Registry) -> Result<Option<TypedJson>, RegistryError> {
		let Some(item) = self.value.get(name) else {
			return Ok(None);
		};
		let ty = match self.ty.descriptor().and_then(|desc| desc.field(name)) {
			Some(declared) => JsonType::of_field(declared, registry)?,
			None => JsonType::Json,
		};
		Ok(Some(Self {
			ty,
			value: Arc::new(item.clone()),
		}))
	}

	/// Read an array element, tagged with the array's element type.
	pub fn element(&self, index: usize) -> Option<TypedJson> {
		let item = self.value.index(index)?;
		let ty = self.ty.element().cloned().unwrap_or_default();
		Some(Self {
			ty,
			value: Arc::new(item.clone()),
		})
	}

	fn retag(&self, ty: JsonType) -> Self {
		Self {
			ty,
			value: self.value.clone(),
		}
	}
}

impl From<Value> for TypedJson {
	fn from(value: Value) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for TypedJson {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.value, f)
	}
}

/// Runs safe and unsafe casts against one registry.
#[derive(Debug, Clone)]
pub struct CastEngine<'r> {
	registry: &'r Registry,
	options: CastOptions,
}

impl<'r> CastEngine<'r> {
	/// Engine over `registry` with default options.
	pub fn new(registry: &'r Registry) -> Self {
		Self {
			registry,
			options: CastOptions::default(),
		}
	}

	/// Replace validation options.
	pub fn with_options(mut self, options: CastOptions) -> Self {
		self.options = options;
		self
	}

	/// Registry used to resolve record shapes.
	pub fn registry(&self) -> &'r Registry {
		self.registry
	}

	/// Re-tag without validation.
	///
	/// Only sound when compatibility was proven elsewhere. Never fails.
	pub fn safe_cast(&self, value: &TypedJson, target: JsonType) -> TypedJson {
		value.retag(target)
	}

	/// Validate against `target` and tag the same payload `json<Target>`.
	pub fn unsafe_cast(&self, value: &TypedJson, target: &Arc<TypeDescriptor>) -> Result<TypedJson, CastError> {
		self.cast_to(value, &JsonType::constrained(target.clone()))
	}

	/// [`Self::unsafe_cast`] with the target looked up by name.
	pub fn unsafe_cast_named(&self, value: &TypedJson, target: &str) -> Result<TypedJson, CastError> {
		let desc = self.registry.describe(target)?;
		self.unsafe_cast(value, &desc)
	}

	/// Validate every element against `element` and tag the array `json<Element>[]`.
	///
	/// One failing element fails the whole array with the array-level message.
	pub fn unsafe_cast_array(&self, value: &TypedJson, element: &Arc<TypeDescriptor>) -> Result<TypedJson, CastError> {
		self.cast_to(value, &JsonType::constrained(element.clone()).array_of())
	}

	/// Cast to any static type: `json` always succeeds and drops the
	/// constraint, `json<T>` and array types validate.
	pub fn cast_to(&self, value: &TypedJson, target: &JsonType) -> Result<TypedJson, CastError> {
		match self.check(value.value(), target) {
			Ok(()) => Ok(value.retag(target.clone())),
			Err(ValidateError::Mismatch(mismatch)) => {
				let err = incompatible(value.ty(), target, mismatch);
				debug!(reason = %err, "cast rejected");
				Err(err)
			}
			Err(ValidateError::DepthExceeded { max_depth }) => {
				debug!(max_depth, target = %target, "cast exceeded depth");
				Err(CastError::DepthExceeded { max_depth })
			}
			Err(ValidateError::Registry(err)) => Err(CastError::Registry(err)),
		}
	}

	fn check(&self, value: &Value, ty: &JsonType) -> Result<(), ValidateError> {
		match ty {
			JsonType::Json => Ok(()),
			JsonType::Constrained(desc) => validate(value, desc, self.registry, &self.options),
			JsonType::Array(inner) => {
				let Some(items) = value.as_array() else {
					return Err(ValidateError::Mismatch(Mismatch {
						shape: shape_name(inner),
						record: FieldPath::root(),
						path: FieldPath::root(),
						kind: MismatchKind::NotArray { found: value.kind() },
					}));
				};
				for (index, item) in items.iter().enumerate() {
					self.check(item, inner).map_err(|err| match err {
						ValidateError::Mismatch(mismatch) => ValidateError::Mismatch(mismatch.under(PathStep::Index(index))),
						other => other,
					})?;
				}
				Ok(())
			}
		}
	}
}

impl CastEngine<'static> {
	/// Engine over [`Registry::global`].
	pub fn global() -> Self {
		Self::new(Registry::global())
	}
}

/// Build the user-visible failure.
///
/// Array targets always report the array types. Record targets report the
/// innermost record that failed, so a bad nested field names its own type.
fn incompatible(from: &JsonType, to: &JsonType, mismatch: Mismatch) -> CastError {
	let (from, to) = match to {
		JsonType::Array(_) => (array_type_name(from), to.to_string()),
		_ if mismatch.is_nested() => ("json".to_owned(), format!("json<{}>", mismatch.shape)),
		_ => (from.to_string(), to.to_string()),
	};
	CastError::Incompatible {
		from,
		to,
		mismatch: Some(mismatch),
	}
}

fn array_type_name(ty: &JsonType) -> String {
	match ty {
		JsonType::Array(_) => ty.to_string(),
		other => format!("{other}[]"),
	}
}

fn shape_name(ty: &JsonType) -> Arc<str> {
	match ty {
		JsonType::Json => "json".into(),
		JsonType::Constrained(desc) => desc.name().into(),
		JsonType::Array(inner) => shape_name(inner),
	}
}
