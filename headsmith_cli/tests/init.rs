mod common;

use headsmith_core::AnyEmptyResult;
use headsmith_core::HeaderConfig;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path().join("shop");
	std::fs::create_dir_all(&root)?;

	common::headsmith_cmd()
		.arg("init")
		.arg("--path")
		.arg(&root)
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"))
		.stdout(predicates::str::contains("Next steps:"));

	let config_path = root.join("headsmith.toml");
	let content = std::fs::read_to_string(&config_path)?;
	assert!(content.contains("project_name = \"shop\""));
	assert!(content.contains("[refresh]"));

	let config = HeaderConfig::from_toml_str(&content)?;
	assert_eq!(config.project_name(&root), "shop");
	assert!(config.refresh.on_save);
	assert_eq!(config.refresh.exclude, vec!["*.md", "*.json", "*.lock"]);

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join(".headsmith.toml");
	std::fs::write(&config_path, "project_name = \"kept\"\n")?;

	common::headsmith_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert_eq!(
		std::fs::read_to_string(&config_path)?,
		"project_name = \"kept\"\n"
	);
	assert!(!tmp.path().join("headsmith.toml").exists());

	Ok(())
}
