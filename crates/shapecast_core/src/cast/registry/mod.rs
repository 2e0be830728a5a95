use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use crate::cast::{RecordDecl, RegistryError, Shape, ShapeRef, TypeDescriptor};

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Outcome of [`Registry::declare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
	/// The declaration was published.
	Inserted,
	/// An identical declaration was already published.
	KeptExisting,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
	order: Vec<Arc<str>>,
	decls: HashMap<Arc<str>, Arc<RecordDecl>>,
	descriptors: HashMap<Arc<str>, Arc<TypeDescriptor>>,
}

/// Read-mostly mapping from record name to declaration and descriptor.
///
/// Readers see immutable snapshots. Writers publish a whole new snapshot with
/// one compare-and-swap, retrying if another writer won. Two threads that
/// describe the same record concurrently may both build it; the first
/// published descriptor is kept and returned to both.
#[derive(Debug)]
pub struct Registry {
	snap: ArcSwap<Snapshot>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(Snapshot::default()),
		}
	}

	/// Process-wide registry, created on first use.
	pub fn global() -> &'static Registry {
		&GLOBAL
	}

	/// Publish a record declaration.
	pub fn declare(&self, decl: RecordDecl) -> Result<Declared, RegistryError> {
		if decl.name.is_empty() {
			return Err(RegistryError::EmptyName { context: "record" });
		}

		let decl = Arc::new(decl);
		loop {
			let cur = self.snap.load_full();
			if let Some(existing) = cur.decls.get(decl.name.as_ref()) {
				if **existing == *decl {
					return Ok(Declared::KeptExisting);
				}
				return Err(RegistryError::Conflict { name: decl.name.to_string() });
			}

			let mut next = (*cur).clone();
			let name: Arc<str> = decl.name.as_ref().into();
			next.order.push(name.clone());
			next.decls.insert(name, decl.clone());

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				debug!(record = %decl.name, fields = decl.fields.len(), "declared record");
				return Ok(Declared::Inserted);
			}
			trace!(record = %decl.name, "declare raced, retrying");
		}
	}

	/// Publish several declarations in order, stopping at the first failure.
	pub fn declare_all(&self, decls: impl IntoIterator<Item = RecordDecl>) -> Result<(), RegistryError> {
		for decl in decls {
			self.declare(decl)?;
		}
		Ok(())
	}

	/// Publish the declaration of a native shape.
	pub fn declare_shape<T: Shape>(&self) -> Result<Declared, RegistryError> {
		self.declare(T::declare())
	}

	/// Return the cached descriptor for `name`, building it on first use.
	pub fn describe(&self, name: &str) -> Result<Arc<TypeDescriptor>, RegistryError> {
		let built = {
			let cur = self.snap.load();
			if let Some(found) = cur.descriptors.get(name) {
				return Ok(found.clone());
			}
			let decl = cur.decls.get(name).ok_or_else(|| RegistryError::UnknownShape { name: name.to_owned() })?;
			TypeDescriptor::build(decl, |other| cur.decls.contains_key(other))?
		};
		Ok(self.publish(Arc::new(built)))
	}

	/// Declare `T` if needed and describe it.
	pub fn describe_shape<T: Shape>(&self) -> Result<Arc<TypeDescriptor>, RegistryError> {
		let decl = T::declare();
		let name = decl.name.clone();
		self.declare(decl)?;
		self.describe(&name)
	}

	/// Describe the record a [`ShapeRef`] points at.
	pub fn resolve(&self, shape: &ShapeRef) -> Result<Arc<TypeDescriptor>, RegistryError> {
		self.describe(shape.name())
	}

	/// Published declaration for `name`.
	pub fn declaration(&self, name: &str) -> Option<Arc<RecordDecl>> {
		self.snap.load().decls.get(name).cloned()
	}

	/// Whether `name` has been declared.
	pub fn is_declared(&self, name: &str) -> bool {
		self.snap.load().decls.contains_key(name)
	}

	/// Declared record names in declaration order.
	pub fn declared(&self) -> Vec<Arc<str>> {
		self.snap.load().order.clone()
	}

	/// Number of descriptors built so far.
	pub fn described_count(&self) -> usize {
		self.snap.load().descriptors.len()
	}

	fn publish(&self, built: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
		loop {
			let cur = self.snap.load_full();
			if let Some(existing) = cur.descriptors.get(built.name()) {
				trace!(record = built.name(), "descriptor already published, dropping duplicate build");
				return existing.clone();
			}

			let mut next = (*cur).clone();
			next.descriptors.insert(built.name().into(), built.clone());

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				debug!(record = built.name(), fields = built.len(), "published descriptor");
				return built;
			}
		}
	}
}
