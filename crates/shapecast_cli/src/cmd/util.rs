use std::path::Path;

use serde::Serialize;
use shapecast::cast::{Registry, Result, ShapeFile, Value};
use tracing::debug;

/// Load a shape file into a fresh registry.
pub(crate) fn load_registry(path: &Path) -> Result<Registry> {
	let text = std::fs::read_to_string(path)?;
	let file = ShapeFile::from_json_str(&text)?;
	let registry = Registry::new();
	registry.declare_all(file.to_decls()?)?;
	debug!(path = %path.display(), records = file.records.len(), "loaded shape file");
	Ok(registry)
}

/// Read a JSON document into the value model.
pub(crate) fn load_value(path: &Path) -> Result<Value> {
	let text = std::fs::read_to_string(path)?;
	Ok(Value::from_json_str(&text)?)
}

/// Print a payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}
