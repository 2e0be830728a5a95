use std::path::PathBuf;

use shapecast::cast::{Registry, Result, TypeDescriptor};

use crate::cmd::util::{emit_json, load_registry};

#[derive(clap::Args)]
pub struct Args {
	pub shapes: PathBuf,
	#[arg(long = "type")]
	pub type_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Describe every record (or one with `--type`), surfacing malformed declarations.
pub fn run(args: Args) -> Result<()> {
	let Args { shapes: path, type_name, json } = args;
	let registry = load_registry(&path)?;

	let names: Vec<String> = match type_name {
		Some(name) => vec![name],
		None => registry.declared().iter().map(|name| name.to_string()).collect(),
	};
	let records = describe_all(&registry, &names)?;

	if json {
		let payload = ShapesJson {
			path: path.display().to_string(),
			records: records.iter().map(|desc| record_json(desc)).collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("records: {}", records.len());
	for desc in &records {
		println!("record: {}", desc.name());
		for (name, ty) in desc.fields() {
			println!("  {ty} {name}");
		}
	}
	Ok(())
}

fn describe_all(registry: &Registry, names: &[String]) -> Result<Vec<std::sync::Arc<TypeDescriptor>>> {
	names.iter().map(|name| Ok(registry.describe(name)?)).collect()
}

fn record_json(desc: &TypeDescriptor) -> RecordJson {
	RecordJson {
		name: desc.name().to_owned(),
		fields: desc
			.fields()
			.map(|(name, ty)| FieldJson {
				name: name.to_owned(),
				ty: ty.to_string(),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	#[serde(rename = "type")]
	ty: String,
}

#[derive(serde::Serialize)]
struct RecordJson {
	name: String,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct ShapesJson {
	path: String,
	records: Vec<RecordJson>,
}
