use super::{Record, Value, ValueKind};

fn person() -> Value {
	Value::Record(Record::new().with("name", "John Doe").with("age", 30).with("address", "London"))
}

#[test]
fn kind_reports_tag() {
	assert_eq!(Value::Null.kind(), ValueKind::Null);
	assert_eq!(Value::from(true).kind(), ValueKind::Bool);
	assert_eq!(Value::from(1_i64).kind(), ValueKind::Int);
	assert_eq!(Value::from(1.5).kind(), ValueKind::Float);
	assert_eq!(Value::from("x").kind(), ValueKind::String);
	assert_eq!(Value::Array(Vec::new()).kind(), ValueKind::Array);
	assert_eq!(person().kind(), ValueKind::Record);
}

#[test]
fn record_keeps_insertion_order() {
	let value = person();
	let record = value.as_record().expect("record");
	assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "age", "address"]);
}

#[test]
fn replacing_a_field_keeps_its_position() {
	let mut record = Record::new().with("a", 1).with("b", 2).with("c", 3);
	let old = record.insert("b", "two");
	assert_eq!(old, Some(Value::Int(2)));
	assert_eq!(record.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
	assert_eq!(record.get("b").and_then(Value::as_str), Some("two"));
}

#[test]
fn remove_keeps_remaining_order() {
	let mut record = Record::new().with("a", 1).with("b", 2).with("c", 3);
	record.remove("a");
	assert_eq!(record.keys().collect::<Vec<_>>(), ["b", "c"]);
}

#[test]
fn display_matches_runtime_format() {
	assert_eq!(person().to_string(), r#"{"name":"John Doe", "age":30, "address":"London"}"#);
}

#[test]
fn display_nested_and_arrays() {
	let value = Value::Array(vec![
		Value::record([("n", Value::Float(30.0))]),
		Value::record([("n", Value::Float(2.5)), ("tags", Value::Array(vec![Value::Null, Value::Bool(false)]))]),
	]);
	assert_eq!(value.to_string(), r#"[{"n":30.0}, {"n":2.5, "tags":[null, false]}]"#);
}

#[test]
fn large_whole_floats_keep_a_fraction() {
	for (float, text) in [(1e16, "10000000000000000.0"), (-3e17, "-300000000000000000.0")] {
		let shown = Value::Float(float).to_string();
		assert_eq!(shown, text);

		let read = Value::from_json_str(&shown).expect("displayed float parses");
		assert_eq!(read.kind(), ValueKind::Float);
		assert_eq!(read.as_float(), Some(float));
	}
}

#[test]
fn display_escapes_strings() {
	let value = Value::from("a\"b\\c\nd\u{1}");
	assert_eq!(value.to_string(), r#""a\"b\\c\nd\u0001""#);
}

#[test]
fn get_and_index_traverse() {
	let value = Value::Array(vec![person()]);
	let name = value.index(0).and_then(|item| item.get("name")).and_then(Value::as_str);
	assert_eq!(name, Some("John Doe"));
	assert!(value.index(1).is_none());
	assert!(value.get("name").is_none());
}

#[test]
fn replacing_an_element_keeps_the_array_tag() {
	let mut value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
	value.as_array_mut().expect("array")[0] = Value::from("x");
	assert_eq!(value.kind(), ValueKind::Array);
	assert_eq!(value.to_string(), r#"["x", 2]"#);
}
