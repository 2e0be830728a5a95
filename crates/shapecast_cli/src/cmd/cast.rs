use std::path::PathBuf;

use shapecast::cast::{CastEngine, CastError, CastOptions, FieldPath, JsonType, Result, ShapeError, TypeExpr, TypedJson};

use crate::cmd::util::{emit_json, load_registry, load_value};

#[derive(clap::Args)]
pub struct Args {
	pub shapes: PathBuf,
	pub value: PathBuf,
	/// Target type: `json`, `Person`, `Person[]`.
	#[arg(long = "type")]
	pub target: String,
	/// Cast the value selected by this path instead of the document root.
	#[arg(long = "at")]
	pub at: Option<String>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Cast a JSON document and print the tagged result.
///
/// With `--json` a rejected cast is still a successful run: the outcome is
/// reported in the payload. Without it, rejection is an error.
pub fn run(args: Args) -> Result<()> {
	let Args {
		shapes,
		value: value_path,
		target,
		at,
		json,
		max_depth,
	} = args;

	let registry = load_registry(&shapes)?;
	let mut value = load_value(&value_path)?;
	if let Some(expr) = at {
		let path = FieldPath::parse(&expr)?;
		value = path.select(&value).cloned().ok_or(ShapeError::FieldPathNotFound { path: expr })?;
	}

	let target = JsonType::from_expr(&TypeExpr::parse(&target)?, &registry)?;
	let mut options = CastOptions::default();
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}

	let engine = CastEngine::new(&registry).with_options(options);
	let input = TypedJson::new(value);
	let result = engine.cast_to(&input, &target);

	if json {
		return emit_json(&cast_json(&target, &result));
	}

	let cast = result?;
	println!("type: {}", cast.ty());
	println!("value: {cast}");
	Ok(())
}

fn cast_json<'a>(target: &JsonType, result: &'a std::result::Result<TypedJson, CastError>) -> CastJson<'a> {
	match result {
		Ok(cast) => CastJson {
			ok: true,
			ty: cast.ty().to_string(),
			value: Some(cast),
			reason: None,
			shape: None,
			path: None,
		},
		Err(err) => CastJson {
			ok: false,
			ty: target.to_string(),
			value: None,
			reason: Some(err.reason()),
			shape: err.mismatch().map(|item| item.shape.to_string()),
			path: err.mismatch().map(|item| item.path.to_string()),
		},
	}
}

#[derive(serde::Serialize)]
struct CastJson<'a> {
	ok: bool,
	#[serde(rename = "type")]
	ty: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	value: Option<&'a TypedJson>,
	#[serde(skip_serializing_if = "Option::is_none")]
	reason: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	shape: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	path: Option<String>,
}
