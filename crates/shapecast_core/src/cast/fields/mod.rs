use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use crate::cast::{Materialize, MaterializeError, NativeType, type_label};

static GLOBAL: LazyLock<FieldTables> = LazyLock::new(FieldTables::new);

/// Participation flags for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
	/// Never read from input.
	pub transient: bool,
	/// Type-level scalar constant; never read from input.
	pub constant: bool,
	/// Type-level value of non-scalar type; input writes are ignored.
	pub shared: bool,
}

impl FieldFlags {
	/// Whether the field takes part in materialization at all.
	pub fn is_skipped(self) -> bool {
		self.transient || self.constant
	}
}

/// One declared field of a native type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTableEntry {
	/// Field name as declared.
	pub name: Box<str>,
	/// Declared native type.
	pub ty: NativeType,
	/// Participation flags.
	pub flags: FieldFlags,
	/// Hierarchy depth: 0 for the type itself, 1 for its base, and so on.
	pub depth: u32,
	/// Input key: the name, or `name#depth` when a shallower field shadows it.
	pub key: Box<str>,
}

/// Flattened field list for a native type, most-derived fields first.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
	type_name: String,
	entries: Vec<FieldTableEntry>,
}

impl FieldTable {
	/// Owning type label.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// All entries, ordered by depth.
	pub fn entries(&self) -> &[FieldTableEntry] {
		&self.entries
	}

	/// Entry for `name` declared at `depth`.
	pub fn entry(&self, name: &str, depth: u32) -> Option<&FieldTableEntry> {
		self.entries.iter().find(|entry| entry.depth == depth && entry.name.as_ref() == name)
	}

	/// Deepest hierarchy level present.
	pub fn max_depth(&self) -> u32 {
		self.entries.iter().map(|entry| entry.depth).max().unwrap_or(0)
	}

	fn check_unique(&self) -> Result<(), MaterializeError> {
		let mut seen = HashSet::new();
		for entry in &self.entries {
			if !seen.insert((entry.depth, entry.name.as_ref())) {
				return Err(MaterializeError::DuplicateField {
					type_name: self.type_name.clone(),
					field: entry.name.to_string(),
					depth: entry.depth,
				});
			}
		}
		Ok(())
	}
}

/// Builder for [`FieldTable`].
///
/// ```ignore
/// FieldTableBuilder::for_type::<Dog>()
/// 	.field("name", NativeType::String)
/// 	.transient("cache", NativeType::Dynamic)
/// 	.extends::<Animal>()
/// 	.build()
/// ```
#[derive(Debug, Clone)]
pub struct FieldTableBuilder {
	type_name: String,
	entries: Vec<FieldTableEntry>,
}

impl FieldTableBuilder {
	/// Start a table with an explicit type label.
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			entries: Vec::new(),
		}
	}

	/// Start a table labelled with `T`'s display name.
	pub fn for_type<T: ?Sized>() -> Self {
		Self::new(type_label::<T>())
	}

	/// Ordinary field.
	pub fn field(self, name: &str, ty: NativeType) -> Self {
		self.push(name, ty, FieldFlags::default())
	}

	/// Field that is never read from input.
	pub fn transient(self, name: &str, ty: NativeType) -> Self {
		self.push(
			name,
			ty,
			FieldFlags {
				transient: true,
				..FieldFlags::default()
			},
		)
	}

	/// Type-level immutable field. Scalar and string types are constants and
	/// skipped; anything else is shared and input writes to it are ignored.
	pub fn type_level(self, name: &str, ty: NativeType) -> Self {
		let flags = if ty.is_scalar() {
			FieldFlags {
				constant: true,
				..FieldFlags::default()
			}
		} else {
			FieldFlags {
				shared: true,
				..FieldFlags::default()
			}
		};
		self.push(name, ty, flags)
	}

	/// Append the fields of base type `B` one level deeper.
	pub fn extends<B: Materialize>(mut self) -> Self {
		let base = B::field_table();
		self.entries.extend(base.entries.into_iter().map(|entry| FieldTableEntry {
			depth: entry.depth + 1,
			..entry
		}));
		self
	}

	/// Finish the table, ordering by depth and assigning input keys.
	pub fn build(mut self) -> FieldTable {
		self.entries.sort_by_key(|entry| entry.depth);

		let mut shallowest: HashMap<Box<str>, u32> = HashMap::new();
		for entry in &self.entries {
			shallowest.entry(entry.name.clone()).or_insert(entry.depth);
		}
		for entry in &mut self.entries {
			let shadowed = shallowest.get(&entry.name).is_some_and(|&depth| depth < entry.depth);
			entry.key = if shadowed {
				format!("{}#{}", entry.name, entry.depth).into()
			} else {
				entry.name.clone()
			};
		}

		FieldTable {
			type_name: self.type_name,
			entries: self.entries,
		}
	}

	fn push(mut self, name: &str, ty: NativeType, flags: FieldFlags) -> Self {
		self.entries.push(FieldTableEntry {
			name: name.into(),
			ty,
			flags,
			depth: 0,
			key: name.into(),
		});
		self
	}
}

/// Cache of built field tables keyed by native type.
///
/// Same publication scheme as [`crate::cast::Registry`]: snapshot swap with
/// a compare-and-swap retry, first published table wins.
#[derive(Debug)]
pub struct FieldTables {
	snap: ArcSwap<HashMap<TypeId, Arc<FieldTable>>>,
}

impl Default for FieldTables {
	fn default() -> Self {
		Self::new()
	}
}

impl FieldTables {
	/// Empty cache.
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(HashMap::new()),
		}
	}

	/// Process-wide cache used by [`crate::cast::materialize`].
	pub fn global() -> &'static FieldTables {
		&GLOBAL
	}

	/// Table for `T`, built and checked on first use.
	pub fn table<T: Materialize>(&self) -> Result<Arc<FieldTable>, MaterializeError> {
		let id = TypeId::of::<T>();
		if let Some(found) = self.snap.load().get(&id) {
			return Ok(found.clone());
		}

		let built = T::field_table();
		built.check_unique()?;
		let built = Arc::new(built);

		loop {
			let cur = self.snap.load_full();
			if let Some(existing) = cur.get(&id) {
				trace!(type_name = built.type_name(), "field table already published");
				return Ok(existing.clone());
			}

			let mut next = (*cur).clone();
			next.insert(id, built.clone());

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				debug!(type_name = built.type_name(), entries = built.entries.len(), "published field table");
				return Ok(built);
			}
		}
	}

	/// Number of cached tables.
	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	/// Whether nothing is cached yet.
	pub fn is_empty(&self) -> bool {
		self.snap.load().is_empty()
	}
}
