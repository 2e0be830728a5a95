use std::any::Any;

use indexmap::IndexMap;
use tracing::trace;

use crate::cast::coerce::{Site, coerce};
use crate::cast::{FieldTable, FieldTables, FromNative, MaterializeError, NarrowingPolicy, Native, NativeArray, Value, ValueKind, type_label};

/// Native types that can be built from a record value.
///
/// The field table says which input keys are read and how they are coerced;
/// [`Materialize::construct`] then receives every collected value at once.
pub trait Materialize: Sized + Send + 'static {
	/// Declared fields, including base types via
	/// [`crate::cast::FieldTableBuilder::extends`].
	fn field_table() -> FieldTable;

	/// Build the instance from collected field values.
	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError>;

	/// Runs after construction; a returned instance replaces the built one.
	fn finalize(&self) -> Option<Self> {
		None
	}
}

/// Coercion and recursion settings for [`materialize`].
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
	/// Int narrowing behavior.
	pub narrowing: NarrowingPolicy,
	/// Maximum nested record depth below the root.
	pub max_depth: u32,
}

impl Default for MaterializeOptions {
	fn default() -> Self {
		Self {
			narrowing: NarrowingPolicy::Checked,
			max_depth: 64,
		}
	}
}

impl MaterializeOptions {
	/// Truncate out-of-range ints instead of failing.
	pub fn best_effort() -> Self {
		Self {
			narrowing: NarrowingPolicy::Truncate,
			..Self::default()
		}
	}
}

/// Collected field values for one hierarchy level, handed to
/// [`Materialize::construct`]. Base levels hang off [`Fields::base`].
#[derive(Debug)]
pub struct Fields {
	type_name: String,
	depth: u32,
	values: IndexMap<Box<str>, Native>,
	base: Option<Box<Fields>>,
}

impl Fields {
	fn new(type_name: &str, depth: u32) -> Self {
		Self {
			type_name: type_name.to_owned(),
			depth,
			values: IndexMap::new(),
			base: None,
		}
	}

	/// Hierarchy depth of this level.
	pub fn depth(&self) -> u32 {
		self.depth
	}

	/// Whether `name` was collected at this level.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Take a scalar, string, dynamic, or array field.
	pub fn take<T: FromNative>(&mut self, name: &str) -> Result<T, MaterializeError> {
		let native = self.remove(name)?;
		T::from_native(native).map_err(|found| self.accessor(name, T::NAME, found))
	}

	/// Take a nested record field; `None` when the input had none.
	pub fn record<T: Materialize>(&mut self, name: &str) -> Result<Option<T>, MaterializeError> {
		match self.remove(name)? {
			Native::Null => Ok(None),
			native => self.downcast(name, native).map(Some),
		}
	}

	/// Take an array-of-records field. A `null` element is a
	/// [`MaterializeError::FieldType`] naming its index; use
	/// [`Fields::records_opt`] to keep them.
	pub fn records<T: Materialize>(&mut self, name: &str) -> Result<Vec<T>, MaterializeError> {
		let items = self.records_opt::<T>(name)?;
		items
			.into_iter()
			.enumerate()
			.map(|(idx, item)| {
				item.ok_or_else(|| MaterializeError::FieldType {
					type_name: self.type_name.clone(),
					field: format!("{name}[{idx}]"),
					expected: type_label::<T>(),
					found: ValueKind::Null,
				})
			})
			.collect()
	}

	/// Take an array-of-records field, `null` elements as `None`.
	pub fn records_opt<T: Materialize>(&mut self, name: &str) -> Result<Vec<Option<T>>, MaterializeError> {
		match self.remove(name)? {
			Native::Null => Ok(Vec::new()),
			Native::Array(array) => array
				.items
				.into_iter()
				.map(|item| match item {
					Native::Null => Ok(None),
					item => self.downcast(name, item).map(Some),
				})
				.collect(),
			other => Err(self.accessor(name, "array", other.kind_name())),
		}
	}

	/// Take an array field along with its component decision.
	pub fn array(&mut self, name: &str) -> Result<Option<NativeArray>, MaterializeError> {
		match self.remove(name)? {
			Native::Null => Ok(None),
			Native::Array(array) => Ok(Some(array)),
			other => Err(self.accessor(name, "array", other.kind_name())),
		}
	}

	/// Fields declared by the base type, one level deeper.
	pub fn base(&mut self) -> Result<&mut Fields, MaterializeError> {
		match self.base.as_deref_mut() {
			Some(base) => Ok(base),
			None => Err(MaterializeError::MissingBase {
				type_name: self.type_name.clone(),
			}),
		}
	}

	fn remove(&mut self, name: &str) -> Result<Native, MaterializeError> {
		self.values.shift_remove(name).ok_or_else(|| MaterializeError::UndeclaredField {
			type_name: self.type_name.clone(),
			field: name.to_owned(),
		})
	}

	fn downcast<T: Materialize>(&self, name: &str, native: Native) -> Result<T, MaterializeError> {
		match native {
			Native::Record(boxed) => boxed
				.downcast::<T>()
				.map(|item| *item)
				.map_err(|_| self.accessor(name, &type_label::<T>(), "record")),
			other => Err(self.accessor(name, &type_label::<T>(), other.kind_name())),
		}
	}

	fn accessor(&self, name: &str, expected: &str, found: &'static str) -> MaterializeError {
		MaterializeError::AccessorType {
			type_name: self.type_name.clone(),
			field: name.to_owned(),
			expected: expected.to_owned(),
			found,
		}
	}
}

/// Build a `T` from a record value.
///
/// Any field error aborts the whole call. The field table cache is only
/// written with fully built tables, so a failed call leaves it consistent.
pub fn materialize<T: Materialize>(value: &Value, options: &MaterializeOptions) -> Result<T, MaterializeError> {
	materialize_at::<T>(value, options, 0)
}

pub(crate) fn build_boxed<T: Materialize>(value: &Value, options: &MaterializeOptions, depth: u32) -> Result<Box<dyn Any + Send>, MaterializeError> {
	Ok(Box::new(materialize_at::<T>(value, options, depth)?))
}

fn materialize_at<T: Materialize>(value: &Value, options: &MaterializeOptions, depth: u32) -> Result<T, MaterializeError> {
	if depth > options.max_depth {
		return Err(MaterializeError::DepthExceeded {
			max_depth: options.max_depth,
		});
	}

	let table = FieldTables::global().table::<T>()?;
	let Some(record) = value.as_record() else {
		return Err(MaterializeError::NotRecord {
			type_name: table.type_name().to_owned(),
			found: value.kind(),
		});
	};

	let mut levels: Vec<Fields> = (0..=table.max_depth()).map(|level| Fields::new(table.type_name(), level)).collect();
	for entry in table.entries() {
		if entry.flags.is_skipped() {
			continue;
		}
		if entry.flags.shared {
			if record.contains_key(&entry.key) {
				trace!(type_name = table.type_name(), field = %entry.name, "ignored write to shared field");
			}
			continue;
		}

		let native = match record.get(&entry.key) {
			Some(item) => {
				let site = Site {
					type_name: table.type_name(),
					field: &entry.key,
				};
				coerce(item, &entry.ty, &site, options, depth)?
			}
			None => entry.ty.default_value(),
		};
		if let Some(level) = levels.get_mut(entry.depth as usize) {
			level.values.insert(entry.name.clone(), native);
		}
	}

	let mut fields = levels
		.into_iter()
		.rev()
		.fold(None, |base, mut level: Fields| {
			level.base = base.map(Box::new);
			Some(level)
		})
		.unwrap_or_else(|| Fields::new(table.type_name(), 0));

	let built = T::construct(&mut fields)?;
	Ok(match built.finalize() {
		Some(replacement) => replacement,
		None => built,
	})
}

#[cfg(test)]
mod tests;
