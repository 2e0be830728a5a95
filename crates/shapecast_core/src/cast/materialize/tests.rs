use super::{Fields, Materialize, MaterializeOptions, materialize};
use crate::cast::{Component, FieldTable, FieldTableBuilder, MaterializeError, NarrowingPolicy, Native, NativeType, Record, Value, ValueKind};

#[derive(Debug, PartialEq)]
struct Person {
	name: String,
	age: f32,
	nickname: Option<String>,
}

impl Materialize for Person {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Person")
			.field("name", NativeType::String)
			.field("age", NativeType::F32)
			.field("nickname", NativeType::String)
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			name: fields.take("name")?,
			age: fields.take("age")?,
			nickname: fields.take("nickname")?,
		})
	}
}

#[test]
fn float_input_fills_f32_field() {
	let value = Value::record([("age", 30.0)]);
	let person: Person = materialize(&value, &MaterializeOptions::default()).expect("materialize");
	assert_eq!(person.age, 30.0_f32);
}

#[test]
fn absent_fields_get_defaults() {
	let person: Person = materialize(&Value::Record(Record::new()), &MaterializeOptions::default()).expect("materialize");
	assert_eq!(
		person,
		Person {
			name: String::new(),
			age: 0.0,
			nickname: None,
		}
	);
}

#[test]
fn field_type_error_aborts() {
	let value = Value::record([("name", Value::from("Ann")), ("age", Value::from("thirty"))]);
	let err = materialize::<Person>(&value, &MaterializeOptions::default()).expect_err("string age");
	assert_eq!(
		err,
		MaterializeError::FieldType {
			type_name: "Person".to_owned(),
			field: "age".to_owned(),
			expected: "f32".to_owned(),
			found: ValueKind::String,
		}
	);
}

#[test]
fn non_record_input_is_rejected() {
	let err = materialize::<Person>(&Value::Int(1), &MaterializeOptions::default()).expect_err("not a record");
	assert!(matches!(err, MaterializeError::NotRecord { found: ValueKind::Int, .. }));
}

#[derive(Debug, PartialEq)]
struct Animal {
	name: String,
	legs: i32,
}

impl Materialize for Animal {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Animal")
			.field("name", NativeType::String)
			.field("legs", NativeType::I32)
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			name: fields.take("name")?,
			legs: fields.take("legs")?,
		})
	}
}

#[derive(Debug, PartialEq)]
struct Dog {
	name: String,
	good: bool,
	animal: Animal,
}

impl Materialize for Dog {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Dog")
			.field("name", NativeType::String)
			.field("good", NativeType::Bool)
			.extends::<Animal>()
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			name: fields.take("name")?,
			good: fields.take("good")?,
			animal: Animal::construct(fields.base()?)?,
		})
	}
}

#[test]
fn shadowed_base_field_reads_depth_key() {
	let value = Value::record([
		("name", Value::from("Rex")),
		("good", Value::Bool(true)),
		("name#1", Value::from("Canis")),
		("legs", Value::Int(4)),
	]);
	let dog: Dog = materialize(&value, &MaterializeOptions::default()).expect("materialize");
	assert_eq!(
		dog,
		Dog {
			name: "Rex".to_owned(),
			good: true,
			animal: Animal {
				name: "Canis".to_owned(),
				legs: 4,
			},
		}
	);
}

#[test]
fn missing_base_level_is_reported() {
	#[derive(Debug)]
	struct Orphan;

	impl Materialize for Orphan {
		fn field_table() -> FieldTable {
			FieldTableBuilder::new("Orphan").build()
		}

		fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
			fields.base()?;
			Ok(Self)
		}
	}

	let err = materialize::<Orphan>(&Value::Record(Record::new()), &MaterializeOptions::default()).expect_err("no base");
	assert_eq!(err, MaterializeError::MissingBase { type_name: "Orphan".to_owned() });
}

#[derive(Debug)]
struct Session {
	user: String,
	token: String,
	saw_token: bool,
	saw_version: bool,
	saw_defaults: bool,
}

impl Materialize for Session {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Session")
			.field("user", NativeType::String)
			.transient("token", NativeType::String)
			.type_level("VERSION", NativeType::I32)
			.type_level("defaults", NativeType::Dynamic)
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			user: fields.take("user")?,
			token: "fresh".to_owned(),
			saw_token: fields.contains("token"),
			saw_version: fields.contains("VERSION"),
			saw_defaults: fields.contains("defaults"),
		})
	}
}

#[test]
fn skipped_and_shared_fields_are_not_collected() {
	let value = Value::record([
		("user", Value::from("ann")),
		("token", Value::from("stale")),
		("VERSION", Value::Int(9)),
		("defaults", Value::record([("theme", "dark")])),
	]);
	let session: Session = materialize(&value, &MaterializeOptions::default()).expect("shared write is ignored");
	assert_eq!(session.user, "ann");
	assert_eq!(session.token, "fresh");
	assert!(!session.saw_token && !session.saw_version && !session.saw_defaults);
}

#[test]
fn reading_a_skipped_field_is_an_error() {
	#[derive(Debug)]
	struct Greedy;

	impl Materialize for Greedy {
		fn field_table() -> FieldTable {
			FieldTableBuilder::new("Greedy").transient("cache", NativeType::String).build()
		}

		fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
			fields.take::<String>("cache")?;
			Ok(Self)
		}
	}

	let value = Value::record([("cache", "x")]);
	let err = materialize::<Greedy>(&value, &MaterializeOptions::default()).expect_err("transient");
	assert_eq!(
		err,
		MaterializeError::UndeclaredField {
			type_name: "Greedy".to_owned(),
			field: "cache".to_owned(),
		}
	);
}

#[derive(Debug, PartialEq)]
struct Small {
	tiny: i8,
	short: i16,
	letter: char,
}

impl Materialize for Small {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Small")
			.field("tiny", NativeType::I8)
			.field("short", NativeType::I16)
			.field("letter", NativeType::Char)
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			tiny: fields.take("tiny")?,
			short: fields.take("short")?,
			letter: fields.take("letter")?,
		})
	}
}

#[test]
fn narrowing_follows_policy() {
	let value = Value::record([("tiny", 300), ("short", 70_000), ("letter", 0x141)]);

	let err = materialize::<Small>(&value, &MaterializeOptions::default()).expect_err("checked");
	assert!(matches!(err, MaterializeError::Overflow { ref field, .. } if field == "tiny"));

	let small: Small = materialize(&value, &MaterializeOptions::best_effort()).expect("truncate");
	assert_eq!(
		small,
		Small {
			tiny: 44,
			short: 4464,
			letter: 'A',
		}
	);
	assert_eq!(MaterializeOptions::best_effort().narrowing, NarrowingPolicy::Truncate);
}

#[test]
fn narrowing_in_range_is_exact() {
	let value = Value::record([("tiny", -5), ("short", 1234), ("letter", 65)]);
	let small: Small = materialize(&value, &MaterializeOptions::default()).expect("checked");
	assert_eq!(
		small,
		Small {
			tiny: -5,
			short: 1234,
			letter: 'A',
		}
	);
}

#[derive(Debug, PartialEq)]
struct Currency {
	code: String,
}

impl Materialize for Currency {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Currency").field("code", NativeType::String).build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self { code: fields.take("code")? })
	}

	fn finalize(&self) -> Option<Self> {
		let canonical = self.code.to_ascii_uppercase();
		(canonical != self.code).then_some(Self { code: canonical })
	}
}

#[test]
fn finalize_replacement_is_returned() {
	let lower: Currency = materialize(&Value::record([("code", "lkr")]), &MaterializeOptions::default()).expect("materialize");
	assert_eq!(lower.code, "LKR");
	let upper: Currency = materialize(&Value::record([("code", "USD")]), &MaterializeOptions::default()).expect("materialize");
	assert_eq!(upper.code, "USD");
}

#[derive(Debug)]
struct Team {
	name: String,
	lead: Option<Person>,
	members: Vec<Person>,
	tags: Option<crate::cast::NativeArray>,
	scores: Vec<f64>,
	wallet: Option<Currency>,
}

impl Materialize for Team {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Team")
			.field("name", NativeType::String)
			.field("lead", NativeType::record::<Person>())
			.field("members", NativeType::array_of(NativeType::record::<Person>()))
			.field("tags", NativeType::inferred_array())
			.field("scores", NativeType::array_of(NativeType::F64))
			.field("wallet", NativeType::record::<Currency>())
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			name: fields.take("name")?,
			lead: fields.record("lead")?,
			members: fields.records("members")?,
			tags: fields.array("tags")?,
			scores: fields.take("scores")?,
			wallet: fields.record("wallet")?,
		})
	}
}

fn member(name: &str, age: f64) -> Value {
	Value::record([("name", Value::from(name)), ("age", Value::Float(age))])
}

#[test]
fn nested_records_and_arrays_materialize() {
	let value = Value::record([
		("name", Value::from("core")),
		("lead", member("Ann", 41.5)),
		("members", Value::Array(vec![member("Bob", 29.0), member("Cy", 35.0)])),
		("tags", Value::Array(vec![Value::from("rust"), Value::from("json")])),
		("scores", Value::Array(vec![Value::Int(1), Value::Float(2.5)])),
		("wallet", Value::record([("code", "eur")])),
	]);
	let team: Team = materialize(&value, &MaterializeOptions::default()).expect("materialize");

	assert_eq!(team.name, "core");
	assert_eq!(team.lead.as_ref().map(|lead| lead.age), Some(41.5));
	let names: Vec<_> = team.members.iter().map(|item| item.name.as_str()).collect();
	assert_eq!(names, ["Bob", "Cy"]);
	assert_eq!(team.scores, [1.0, 2.5]);
	assert_eq!(team.wallet, Some(Currency { code: "EUR".to_owned() }), "nested finalize runs");

	let tags = team.tags.expect("tags present");
	assert_eq!(tags.component, Component::Inferred(NativeType::String));
	assert!(matches!(tags.items.as_slice(), [Native::String(a), Native::String(b)] if a == "rust" && b == "json"));
}

#[test]
fn absent_nested_fields_are_empty() {
	let team: Team = materialize(&Value::record([("name", "solo")]), &MaterializeOptions::default()).expect("materialize");
	assert!(team.lead.is_none());
	assert!(team.members.is_empty());
	assert!(team.tags.is_none());
	assert!(team.scores.is_empty());
}

#[test]
fn nested_error_aborts_outer() {
	let value = Value::record([
		("name", Value::from("core")),
		("members", Value::Array(vec![member("Bob", 29.0), Value::record([("age", "old")])])),
	]);
	let err = materialize::<Team>(&value, &MaterializeOptions::default()).expect_err("bad member");
	assert!(matches!(err, MaterializeError::FieldType { ref type_name, .. } if type_name == "Person"));
}

#[test]
fn null_member_is_reported_by_index() {
	let value = Value::record([
		("name", Value::from("core")),
		("members", Value::Array(vec![member("Bob", 29.0), Value::Null])),
	]);
	let err = materialize::<Team>(&value, &MaterializeOptions::default()).expect_err("null member");
	assert!(
		matches!(err, MaterializeError::FieldType { ref field, found: ValueKind::Null, .. } if field == "members[1]"),
		"{err}"
	);
}

#[derive(Debug)]
struct Roster {
	slots: Vec<Option<Person>>,
}

impl Materialize for Roster {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Roster")
			.field("slots", NativeType::array_of(NativeType::record::<Person>()))
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			slots: fields.records_opt("slots")?,
		})
	}
}

#[test]
fn null_records_are_kept_as_none() {
	let value = Value::record([("slots", Value::Array(vec![member("Bob", 29.0), Value::Null, member("Cy", 35.0)]))]);
	let roster: Roster = materialize(&value, &MaterializeOptions::default()).expect("materialize");

	let names: Vec<_> = roster.slots.iter().map(|slot| slot.as_ref().map(|item| item.name.as_str())).collect();
	assert_eq!(names, [Some("Bob"), None, Some("Cy")]);
}

#[derive(Debug)]
struct Node {
	children: Vec<Node>,
}

impl Materialize for Node {
	fn field_table() -> FieldTable {
		FieldTableBuilder::new("Node")
			.field("children", NativeType::array_of(NativeType::record::<Node>()))
			.build()
	}

	fn construct(fields: &mut Fields) -> Result<Self, MaterializeError> {
		Ok(Self {
			children: fields.records("children")?,
		})
	}
}

fn chain(levels: usize) -> Value {
	let mut node = Value::record([("children", Value::Array(Vec::new()))]);
	for _ in 0..levels {
		node = Value::record([("children", Value::Array(vec![node]))]);
	}
	node
}

#[test]
fn recursion_depth_is_bounded() {
	let options = MaterializeOptions {
		max_depth: 2,
		..MaterializeOptions::default()
	};
	let shallow: Node = materialize(&chain(2), &options).expect("within limit");
	assert_eq!(shallow.children.len(), 1);

	let err = materialize::<Node>(&chain(3), &options).expect_err("too deep");
	assert_eq!(err, MaterializeError::DepthExceeded { max_depth: 2 });
}
