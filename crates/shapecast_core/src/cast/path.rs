use std::fmt;

use crate::cast::{Result, ShapeError, Value};

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named record field.
	Field(Box<str>),
	/// Select an array element by zero-based index.
	Index(usize),
}

/// Location of a value relative to a cast or lookup root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Path that selects the root itself.
	pub fn root() -> Self {
		Self::default()
	}

	/// Whether the path selects the root.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Return this path with `step` prepended.
	pub fn under(mut self, step: PathStep) -> Self {
		self.steps.insert(0, step);
		self
	}

	/// Follow the path from `root`.
	pub fn select<'a>(&self, root: &'a Value) -> Option<&'a Value> {
		self.steps.iter().try_fold(root, |current, step| match step {
			PathStep::Field(name) => current.get(name),
			PathStep::Index(index) => current.index(*index),
		})
	}

	/// Parse dotted field syntax with optional `[index]` selectors.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || ShapeError::InvalidFieldPath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			let start = idx;
			while idx < bytes.len() && bytes[idx] != b'.' && bytes[idx] != b'[' {
				idx += 1;
			}

			// A leading index (`[0].name`) selects into a root array.
			if idx == start && !(start == 0 && bytes[idx] == b'[') {
				return Err(invalid());
			}
			if idx > start {
				steps.push(PathStep::Field(input[start..idx].into()));
			}

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx].is_ascii_digit() {
					idx += 1;
				}
				if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
					return Err(invalid());
				}

				let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
				steps.push(PathStep::Index(number));
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { steps })
	}
}

impl From<Vec<PathStep>> for FieldPath {
	fn from(steps: Vec<PathStep>) -> Self {
		Self { steps }
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.steps.is_empty() {
			return f.write_str("$");
		}
		for (idx, step) in self.steps.iter().enumerate() {
			match step {
				PathStep::Field(name) if idx == 0 => f.write_str(name)?,
				PathStep::Field(name) => write!(f, ".{name}")?,
				PathStep::Index(index) => write!(f, "[{index}]")?,
			}
		}
		Ok(())
	}
}
