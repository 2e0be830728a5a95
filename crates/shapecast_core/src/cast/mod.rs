mod coerce;
mod decl;
mod descriptor;
mod engine;
mod error;
mod fields;
mod interop;
mod json_type;
mod materialize;
mod native;
mod path;
mod registry;
mod type_name;
mod validate;
mod value;

/// Int narrowing policy and array component resolution.
pub use coerce::{NarrowingPolicy, resolve_component};
/// Declared record shapes and type expressions.
pub use decl::{FieldDecl, RecordDecl, ScalarKind, Shape, ShapeFields, ShapeFile, TypeExpr};
/// Resolved structural metadata.
pub use descriptor::{FieldType, ShapeRef, TypeDescriptor};
/// Safe and unsafe casts over tagged values.
pub use engine::{CastEngine, TypedJson};
/// Error and result aliases.
pub use error::{CastError, MaterializeError, RegistryError, Result, ShapeError};
/// Native field tables and their cache.
pub use fields::{FieldFlags, FieldTable, FieldTableBuilder, FieldTableEntry, FieldTables};
/// Static type tags.
pub use json_type::JsonType;
/// Native materialization entry point and options.
pub use materialize::{Fields, Materialize, MaterializeOptions, materialize};
/// Native field types and collected values.
pub use native::{Component, FromNative, Native, NativeArray, NativeType, RecordType};
/// Field path parser types.
pub use path::{FieldPath, PathStep};
/// Record shape registry.
pub use registry::{Declared, Registry};
/// Native type display names.
pub use type_name::{display_name_of, type_label};
/// Structural validation.
pub use validate::{CastOptions, Mismatch, MismatchKind, ValidateError, validate};
/// Dynamic value model.
pub use value::{Record, Value, ValueKind};
