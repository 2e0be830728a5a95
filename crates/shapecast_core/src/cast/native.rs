use std::any::{Any, TypeId};
use std::fmt;

use crate::cast::materialize::build_boxed;
use crate::cast::{Materialize, MaterializeError, MaterializeOptions, Value, type_label};

/// Declared native type of a materialized field.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeType {
	/// `bool`.
	Bool,
	/// `i8`, narrowed from int.
	I8,
	/// `i16`, narrowed from int.
	I16,
	/// `i32`, narrowed from int.
	I32,
	/// `i64`.
	I64,
	/// `f32`, rounded from float or widened from int.
	F32,
	/// `f64`, widened from int.
	F64,
	/// `char`, narrowed from int.
	Char,
	/// Owned string.
	String,
	/// Raw [`Value`], no coercion.
	Dynamic,
	/// Nested materialized type.
	Record(RecordType),
	/// Array; `None` infers the component from the first element.
	Array(Option<Box<NativeType>>),
}

impl NativeType {
	/// Array of `component`.
	pub fn array_of(component: NativeType) -> Self {
		Self::Array(Some(Box::new(component)))
	}

	/// Array whose component is inferred at runtime.
	pub fn inferred_array() -> Self {
		Self::Array(None)
	}

	/// Nested materialized type `T`.
	pub fn record<T: Materialize>() -> Self {
		Self::Record(RecordType::of::<T>())
	}

	/// Value assigned when the input key is absent: zero for numbers, `'\0'`
	/// for `char`, [`Native::Null`] otherwise.
	pub fn default_value(&self) -> Native {
		match self {
			Self::I8 => Native::I8(0),
			Self::I16 => Native::I16(0),
			Self::I32 => Native::I32(0),
			Self::I64 => Native::I64(0),
			Self::F32 => Native::F32(0.0),
			Self::F64 => Native::F64(0.0),
			Self::Char => Native::Char('\0'),
			_ => Native::Null,
		}
	}

	/// Whether this is a scalar or string type.
	pub fn is_scalar(&self) -> bool {
		!matches!(self, Self::Dynamic | Self::Record(_) | Self::Array(_))
	}
}

impl fmt::Display for NativeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool => f.write_str("bool"),
			Self::I8 => f.write_str("i8"),
			Self::I16 => f.write_str("i16"),
			Self::I32 => f.write_str("i32"),
			Self::I64 => f.write_str("i64"),
			Self::F32 => f.write_str("f32"),
			Self::F64 => f.write_str("f64"),
			Self::Char => f.write_str("char"),
			Self::String => f.write_str("String"),
			Self::Dynamic => f.write_str("Value"),
			Self::Record(record) => f.write_str(&record.label()),
			Self::Array(Some(inner)) => write!(f, "{inner}[]"),
			Self::Array(None) => f.write_str("?[]"),
		}
	}
}

type BuildFn = fn(&Value, &MaterializeOptions, u32) -> Result<Box<dyn Any + Send>, MaterializeError>;

/// Handle to a [`Materialize`] type usable inside a field table.
#[derive(Clone, Copy)]
pub struct RecordType {
	id: TypeId,
	label: fn() -> String,
	build: BuildFn,
}

impl RecordType {
	/// Handle for `T`.
	pub fn of<T: Materialize>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			label: type_label::<T>,
			build: build_boxed::<T>,
		}
	}

	/// Type identity.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Display name.
	pub fn label(&self) -> String {
		(self.label)()
	}

	pub(crate) fn build(&self, value: &Value, options: &MaterializeOptions, depth: u32) -> Result<Box<dyn Any + Send>, MaterializeError> {
		(self.build)(value, options, depth)
	}
}

impl PartialEq for RecordType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl fmt::Debug for RecordType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RecordType").field(&self.label()).finish()
	}
}

/// Collected field value, already coerced to its declared type.
#[derive(Debug)]
pub enum Native {
	/// Absent.
	Null,
	/// `bool`.
	Bool(bool),
	/// `i8`.
	I8(i8),
	/// `i16`.
	I16(i16),
	/// `i32`.
	I32(i32),
	/// `i64`.
	I64(i64),
	/// `f32`.
	F32(f32),
	/// `f64`.
	F64(f64),
	/// `char`.
	Char(char),
	/// Owned string.
	String(String),
	/// Raw dynamic value.
	Dynamic(Value),
	/// Materialized nested instance.
	Record(Box<dyn Any + Send>),
	/// Materialized array.
	Array(NativeArray),
}

impl Native {
	/// Short kind name for diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::I8(_) => "i8",
			Self::I16(_) => "i16",
			Self::I32(_) => "i32",
			Self::I64(_) => "i64",
			Self::F32(_) => "f32",
			Self::F64(_) => "f64",
			Self::Char(_) => "char",
			Self::String(_) => "String",
			Self::Dynamic(_) => "Value",
			Self::Record(_) => "record",
			Self::Array(_) => "array",
		}
	}
}

/// Which component type an array was materialized with.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
	/// Taken from the field declaration.
	Declared(NativeType),
	/// Inferred from the first element of the input.
	Inferred(NativeType),
}

impl Component {
	/// Component type, however it was chosen.
	pub fn ty(&self) -> &NativeType {
		match self {
			Self::Declared(ty) | Self::Inferred(ty) => ty,
		}
	}

	/// Whether the component came from runtime data.
	pub fn is_inferred(&self) -> bool {
		matches!(self, Self::Inferred(_))
	}
}

/// Materialized array with its component decision.
#[derive(Debug)]
pub struct NativeArray {
	/// Component type used for every element.
	pub component: Component,
	/// Elements in input order.
	pub items: Vec<Native>,
}

/// Conversion out of a collected [`Native`] value.
pub trait FromNative: Sized {
	/// Type name used in accessor errors.
	const NAME: &'static str;

	/// Convert, or return the kind name that was found instead.
	fn from_native(native: Native) -> Result<Self, &'static str>;
}

macro_rules! from_native {
	($ty:ty, $name:literal, $variant:ident, $null:expr) => {
		impl FromNative for $ty {
			const NAME: &'static str = $name;

			fn from_native(native: Native) -> Result<Self, &'static str> {
				match native {
					Native::$variant(v) => Ok(v),
					Native::Null => Ok($null),
					other => Err(other.kind_name()),
				}
			}
		}
	};
}

from_native!(bool, "bool", Bool, false);
from_native!(i8, "i8", I8, 0);
from_native!(i16, "i16", I16, 0);
from_native!(i32, "i32", I32, 0);
from_native!(i64, "i64", I64, 0);
from_native!(f32, "f32", F32, 0.0);
from_native!(f64, "f64", F64, 0.0);
from_native!(char, "char", Char, '\0');
from_native!(String, "String", String, String::new());
from_native!(Value, "Value", Dynamic, Value::Null);

impl<T: FromNative> FromNative for Option<T> {
	const NAME: &'static str = T::NAME;

	fn from_native(native: Native) -> Result<Self, &'static str> {
		match native {
			Native::Null => Ok(None),
			other => T::from_native(other).map(Some),
		}
	}
}

impl<T: FromNative> FromNative for Vec<T> {
	const NAME: &'static str = "array";

	fn from_native(native: Native) -> Result<Self, &'static str> {
		match native {
			Native::Array(array) => array.items.into_iter().map(T::from_native).collect(),
			Native::Null => Ok(Vec::new()),
			other => Err(other.kind_name()),
		}
	}
}
