#![allow(missing_docs)]

use std::process::{Command, Output};

use serde_json::Value;
use shapecast_testkit::fixture_path;

#[test]
fn shapes_json_lists_records_in_file_order() {
	let json = run_json(&["shapes", &fixture("shapes.json"), "--json"]);

	let names: Vec<_> = json["records"]
		.as_array()
		.expect("records array")
		.iter()
		.filter_map(|item| item["name"].as_str())
		.collect();
	assert_eq!(names, ["Person", "Student", "Employee", "PhoneNumber", "Address", "Contact", "Node"]);

	let contact = &json["records"][5];
	assert_eq!(contact["fields"][2]["name"], "friends");
	assert_eq!(contact["fields"][2]["type"], "Person[]");
}

#[test]
fn shapes_type_filter_describes_one_record() {
	let json = run_json(&["shapes", &fixture("shapes.json"), "--type", "Address", "--json"]);
	let records = json["records"].as_array().expect("records array");
	assert_eq!(records.len(), 1);
	assert_eq!(records[0]["fields"][1]["type"], "PhoneNumber");
}

#[test]
fn cast_record_succeeds() {
	let json = run_json(&["cast", &fixture("shapes.json"), &fixture("person.json"), "--type", "Person", "--json"]);

	assert_eq!(json["ok"], true);
	assert_eq!(json["type"], "json<Person>");
	assert_eq!(json["value"]["name"], "John Doe");
	assert_eq!(json["value"]["age"], 30);
}

#[test]
fn cast_array_keeps_extra_fields() {
	let json = run_json(&["cast", &fixture("shapes.json"), &fixture("students.json"), "--type", "Student[]", "--json"]);

	assert_eq!(json["ok"], true);
	assert_eq!(json["type"], "json<Student>[]");
	assert_eq!(json["value"][0]["class"], "5");
}

#[test]
fn cast_mixed_array_reports_array_level_reason() {
	let json = run_json(&[
		"cast",
		&fixture("shapes.json"),
		&fixture("students_mixed.json"),
		"--type",
		"Student[]",
		"--json",
	]);

	assert_eq!(json["ok"], false);
	assert_eq!(json["reason"], "'json[]' cannot be cast to 'json<Student>[]'");
	assert_eq!(json["path"], "[1]");
	assert!(json.get("value").is_none(), "rejected cast carries no value");
}

#[test]
fn cast_nested_failure_names_innermost_record() {
	let json = run_json(&["cast", &fixture("shapes.json"), &fixture("nested.json"), "--type", "Contact", "--json"]);

	assert_eq!(json["ok"], false);
	assert_eq!(json["reason"], "'json' cannot be cast to 'json<PhoneNumber>'");
	assert_eq!(json["shape"], "PhoneNumber");
	assert_eq!(json["path"], "address.phoneNumber");
}

#[test]
fn cast_at_path_selects_sub_value() {
	let json = run_json(&[
		"cast",
		&fixture("shapes.json"),
		&fixture("nested.json"),
		"--at",
		"friends[0]",
		"--type",
		"Person",
		"--json",
	]);

	assert_eq!(json["ok"], true);
	assert_eq!(json["value"]["address"], "London");
}

#[test]
fn cast_text_mode_fails_on_rejection() {
	let output = run(&["cast", &fixture("shapes.json"), &fixture("person.json"), "--type", "Employee"]);

	assert!(!output.status.success(), "rejected cast should fail");
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("'json' cannot be cast to 'json<Employee>'"), "stderr: {stderr}");
}

#[test]
fn cast_to_scalar_type_is_rejected() {
	let output = run(&["cast", &fixture("shapes.json"), &fixture("person.json"), "--type", "int"]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("not a json cast target"));
}

fn fixture(name: &str) -> String {
	fixture_path(name).display().to_string()
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_shapecast")).args(args).output().expect("shapecast command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(
		output.status.success(),
		"shapecast command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
