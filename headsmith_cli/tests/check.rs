mod common;

use headsmith_core::AnyEmptyResult;
use serde_json::Value;

fn project(root: &std::path::Path) -> std::io::Result<()> {
	std::fs::write(root.join("headsmith.toml"), "project_name = \"demo\"\n")?;
	std::fs::create_dir_all(root.join("src"))?;
	std::fs::write(root.join("src/main.rs"), "fn main() {}\n")?;
	std::fs::write(root.join("src/util.py"), "VALUE = 1\n")?;
	std::fs::write(root.join("notes.unknownext"), "free text\n")?;
	Ok(())
}

#[test]
fn check_passes_when_every_file_has_a_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	project(tmp.path())?;
	common::inject(tmp.path(), "src/main.rs").success();
	common::inject(tmp.path(), "src/util.py").success();

	common::headsmith_cmd()
		.arg("check")
		.arg("src")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: all 2 file(s) have a header.",
		));

	Ok(())
}

#[test]
fn check_fails_for_missing_headers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	project(tmp.path())?;
	common::inject(tmp.path(), "src/main.rs").success();

	common::headsmith_cmd()
		.arg("check")
		.arg("src")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Missing headers:"))
		.stderr(predicates::str::contains("src/util.py (no header)"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	project(tmp.path())?;
	std::fs::write(
		tmp.path().join("src/stray.rs"),
		"* +==== END demo =================+\nfn stray() {}\n",
	)?;

	let output = common::headsmith_cmd()
		.arg("check")
		.arg("src")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], false);
	assert_eq!(json["checked"], 3);

	let missing = json["missing"]
		.as_array()
		.ok_or("missing should be an array")?;
	assert_eq!(missing.len(), 3);
	let stray = missing
		.iter()
		.find(|entry| entry["file"] == "src/stray.rs")
		.ok_or("stray.rs should be reported")?;
	assert_eq!(stray["state"], "broken");
	assert_eq!(stray["kind"], "stray_closer");

	Ok(())
}

#[test]
fn check_respects_exclusions() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	project(tmp.path())?;
	std::fs::write(
		tmp.path().join("headsmith.toml"),
		"project_name = \"demo\"\n\n[refresh]\nexclude = [\"*.py\", \"*.toml\"]\n",
	)?;
	common::inject(tmp.path(), "src/main.rs").success();

	common::headsmith_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all 1 file(s)"));

	Ok(())
}
