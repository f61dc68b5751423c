mod common;

use headsmith_core::AnyEmptyResult;
use rstest::rstest;
use similar_asserts::assert_eq;

fn refresh_cmd(root: &std::path::Path, file: &str) -> assert_cmd::Command {
	let mut cmd = common::headsmith_cmd();
	cmd.arg("refresh")
		.arg(file)
		.arg("--path")
		.arg(root)
		.arg("--non-interactive");
	cmd
}

#[test]
fn refresh_updates_only_the_timestamp() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("headsmith.toml"), "project_name = \"demo\"\n")?;
	std::fs::write(tmp.path().join("lib.rs"), "pub fn answer() -> u8 {\n\t42\n}\n")?;
	common::inject(tmp.path(), "lib.rs").success();
	let before = std::fs::read_to_string(tmp.path().join("lib.rs"))?;

	refresh_cmd(tmp.path(), "lib.rs")
		.assert()
		.success()
		.stdout(predicates::str::contains("refreshed lib.rs (line 14)"));

	let after = std::fs::read_to_string(tmp.path().join("lib.rs"))?;
	let differing: Vec<(&str, &str)> = before
		.lines()
		.zip(after.lines())
		.filter(|(a, b)| a != b)
		.collect();
	assert!(differing.len() <= 1, "changed lines: {differing:?}");
	assert!(
		differing
			.iter()
			.all(|(_, line)| line.starts_with("* LAST Modified: "))
	);
	assert_eq!(before.lines().count(), after.lines().count());

	Ok(())
}

#[rstest]
#[case::declined_without_prompt("", "no header and creation was declined")]
#[case::creation_disabled(
	"[refresh]\nprompt_to_create = false\n",
	"no header and creation on save is disabled"
)]
#[case::refresh_disabled("[refresh]\non_save = false\n", "refresh on save is disabled")]
#[case::excluded(
	"[refresh]\nexclude = [\"scripts/**\"]\n",
	"file matches an exclusion pattern"
)]
fn refresh_skips_without_editing(#[case] config: &str, #[case] reason: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("headsmith.toml"), config)?;
	std::fs::create_dir_all(tmp.path().join("scripts"))?;
	std::fs::write(tmp.path().join("scripts/run.sh"), "echo hi\n")?;

	refresh_cmd(tmp.path(), "scripts/run.sh")
		.assert()
		.success()
		.stdout(predicates::str::contains(format!(
			"skipped scripts/run.sh: {reason}"
		)));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("scripts/run.sh"))?,
		"echo hi\n"
	);

	Ok(())
}

#[test]
fn refresh_with_yes_creates_missing_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("headsmith.toml"), "project_name = \"demo\"\n")?;
	std::fs::write(tmp.path().join("run.sh"), "#!/bin/sh\necho hi\n")?;

	refresh_cmd(tmp.path(), "run.sh")
		.arg("--yes")
		.assert()
		.success()
		.stdout(predicates::str::contains("inserted run.sh"));

	let content = std::fs::read_to_string(tmp.path().join("run.sh"))?;
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines[0], "#!/bin/sh");
	assert_eq!(lines[1], "");
	assert_eq!(lines[2], "# +==== BEGIN demo =================+");
	assert_eq!(lines.last(), Some(&"echo hi"));

	Ok(())
}

#[test]
fn refresh_leaves_mixed_line_endings_alone() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("headsmith.toml"), "project_name = \"demo\"\n")?;
	std::fs::write(tmp.path().join("app.py"), "a = 1\n")?;
	common::inject(tmp.path(), "app.py").success();

	let path = tmp.path().join("app.py");
	let before = format!("{}b = 2\r\nc = 3\r\n", std::fs::read_to_string(&path)?);
	std::fs::write(&path, &before)?;

	refresh_cmd(tmp.path(), "app.py")
		.assert()
		.success()
		.stdout(predicates::str::contains("refreshed app.py (line 13)"));

	let after = std::fs::read_to_string(&path)?;
	assert_eq!(after.matches("\r\n").count(), 2);
	assert!(after.ends_with("a = 1\nb = 2\r\nc = 3\r\n"));
	let changed = before
		.split_inclusive('\n')
		.zip(after.split_inclusive('\n'))
		.filter(|(old, new)| old != new)
		.count();
	assert!(changed <= 1);

	Ok(())
}
