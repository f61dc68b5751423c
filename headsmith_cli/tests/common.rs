use std::path::Path;

use assert_cmd::Command;

pub fn headsmith_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_headsmith"));
	cmd.env("NO_COLOR", "1").env_remove("HEADSMITH_LOG");
	cmd
}

/// Run `headsmith inject` on `file` inside `root` without prompting.
pub fn inject(root: &Path, file: &str) -> assert_cmd::assert::Assert {
	headsmith_cmd()
		.arg("inject")
		.arg(file)
		.arg("--path")
		.arg(root)
		.arg("--non-interactive")
		.assert()
}
