use crate::cast::{Component, MaterializeError, MaterializeOptions, Native, NativeArray, NativeType, Value, ValueKind};

/// How an int is narrowed into `i32`, `i16`, `i8`, or `char`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NarrowingPolicy {
	/// Out-of-range values fail with [`MaterializeError::Overflow`].
	#[default]
	Checked,
	/// Keep the low bits; `char` takes the low byte.
	Truncate,
}

/// Pick the element type for an array field.
///
/// A declared component wins. Without one the first element decides: string
/// gives `String`, int gives `i64`, float gives `f64`, anything else (or an
/// empty array) gives [`NativeType::Dynamic`].
pub fn resolve_component(declared: Option<&NativeType>, items: &[Value]) -> Component {
	if let Some(ty) = declared {
		return Component::Declared(ty.clone());
	}
	let inferred = match items.first().map(Value::kind) {
		Some(ValueKind::String) => NativeType::String,
		Some(ValueKind::Int) => NativeType::I64,
		Some(ValueKind::Float) => NativeType::F64,
		_ => NativeType::Dynamic,
	};
	Component::Inferred(inferred)
}

/// Field being written, for error reporting.
pub(crate) struct Site<'a> {
	pub(crate) type_name: &'a str,
	pub(crate) field: &'a str,
}

impl Site<'_> {
	fn mismatch(&self, ty: &NativeType, value: &Value) -> MaterializeError {
		MaterializeError::FieldType {
			type_name: self.type_name.to_owned(),
			field: self.field.to_owned(),
			expected: ty.to_string(),
			found: value.kind(),
		}
	}

	fn overflow(&self, ty: &NativeType, value: impl ToString) -> MaterializeError {
		MaterializeError::Overflow {
			type_name: self.type_name.to_owned(),
			field: self.field.to_owned(),
			value: value.to_string(),
			target: ty.to_string(),
		}
	}
}

/// Coerce one input value to its declared native type.
pub(crate) fn coerce(value: &Value, ty: &NativeType, site: &Site<'_>, options: &MaterializeOptions, depth: u32) -> Result<Native, MaterializeError> {
	if value.is_null() {
		return Ok(ty.default_value());
	}

	let policy = options.narrowing;
	match (ty, value) {
		(NativeType::Dynamic, _) => Ok(Native::Dynamic(value.clone())),
		(NativeType::Bool, Value::Bool(v)) => Ok(Native::Bool(*v)),
		(NativeType::I64, Value::Int(v)) => Ok(Native::I64(*v)),
		(NativeType::I32, Value::Int(v)) => narrow(*v, policy, |v| i32::try_from(v).ok(), |v| v as i32)
			.map(Native::I32)
			.ok_or_else(|| site.overflow(ty, v)),
		(NativeType::I16, Value::Int(v)) => narrow(*v, policy, |v| i16::try_from(v).ok(), |v| v as i16)
			.map(Native::I16)
			.ok_or_else(|| site.overflow(ty, v)),
		(NativeType::I8, Value::Int(v)) => narrow(*v, policy, |v| i8::try_from(v).ok(), |v| v as i8)
			.map(Native::I8)
			.ok_or_else(|| site.overflow(ty, v)),
		(NativeType::Char, Value::Int(v)) => narrow(
			*v,
			policy,
			|v| u32::try_from(v).ok().and_then(char::from_u32),
			|v| char::from_u32(u32::from(v as i8 as u16)).unwrap_or(char::REPLACEMENT_CHARACTER),
		)
		.map(Native::Char)
		.ok_or_else(|| site.overflow(ty, v)),
		(NativeType::F64, Value::Float(v)) => Ok(Native::F64(*v)),
		(NativeType::F64, Value::Int(v)) => Ok(Native::F64(*v as f64)),
		(NativeType::F32, Value::Float(v)) if v.is_finite() && v.abs() > f64::from(f32::MAX) => Err(site.overflow(ty, v)),
		(NativeType::F32, Value::Float(v)) => Ok(Native::F32(*v as f32)),
		(NativeType::F32, Value::Int(v)) => Ok(Native::F32(*v as f32)),
		(NativeType::String, Value::String(v)) => Ok(Native::String(v.to_string())),
		(NativeType::Record(record), Value::Record(_)) => Ok(Native::Record(record.build(value, options, depth + 1)?)),
		(NativeType::Array(declared), Value::Array(items)) => {
			let component = resolve_component(declared.as_deref(), items);
			let items = items
				.iter()
				.map(|item| coerce(item, component.ty(), site, options, depth))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(Native::Array(NativeArray { component, items }))
		}
		_ => Err(site.mismatch(ty, value)),
	}
}

fn narrow<N>(value: i64, policy: NarrowingPolicy, checked: impl FnOnce(i64) -> Option<N>, truncate: impl FnOnce(i64) -> N) -> Option<N> {
	match policy {
		NarrowingPolicy::Checked => checked(value),
		NarrowingPolicy::Truncate => Some(truncate(value)),
	}
}
