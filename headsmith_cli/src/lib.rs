use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Stamp and refresh metadata headers at the top of your source files.",
	long_about = "headsmith writes a decorated metadata header (project, file, creation date, last \
	              modified, description, purpose) at the top of source files using the comment \
	              syntax of each file's language, and keeps the last-modified timestamp \
	              current.\n\nQuick start:\n  headsmith init               Create a \
	              headsmith.toml\n  headsmith inject src/main.rs  Add a header\n  headsmith \
	              check               Find files without a header\n  headsmith watch            \
	              Refresh headers whenever files are saved"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct HeadsmithCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Answer yes to every confirmation, such as creating a missing header
	/// during a refresh.
	#[arg(long, short, global = true, default_value_t = false)]
	pub yes: bool,

	/// Never prompt. Free-text fields stay empty, choices use the first
	/// option and confirmations are declined unless `--yes` is set.
	#[arg(long, global = true, default_value_t = false)]
	pub non_interactive: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `headsmith.toml` in the project root.
	///
	/// If a config file already exists this command is a no-op and exits
	/// successfully.
	Init,
	/// Add a header to each file, or refresh the existing one.
	///
	/// The description and purpose are prompted for unless given on the
	/// command line.
	Inject {
		/// Files to add a header to.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Description written into the header.
		#[arg(long)]
		description: Option<String>,

		/// Purpose written into the header.
		#[arg(long)]
		purpose: Option<String>,

		/// Language identifier used instead of the file extension, for
		/// example `python` or `typescript`.
		#[arg(long)]
		language: Option<String>,

		/// Print the changes as a diff without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Refresh the last-modified timestamp as if each file had been saved.
	///
	/// Honours `[refresh]` in the config: disabled refreshes and excluded
	/// files are skipped, and files without a header are offered a new one.
	Refresh {
		/// Files to refresh.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Print the changes as a diff without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Report files that have no complete header.
	///
	/// Walks the given paths (the project root by default) respecting
	/// `.gitignore` and the configured exclusions. Exits with a non-zero
	/// status code if any file is missing a header.
	Check {
		/// Files or directories to check.
		paths: Vec<PathBuf>,

		/// Output format. Use `text` for human-readable output or `json`
		/// for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Refresh headers whenever files change on disk.
	///
	/// Runs the refresh operation on every modified file. Changes to the
	/// config file or the rule source are picked up without a restart.
	Watch {
		/// Files or directories to watch.
		paths: Vec<PathBuf>,
	},
	/// List the comment rules in effect.
	Languages {
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Show the comment style and prefixes resolved for a file.
	Resolve {
		file: PathBuf,

		/// Language identifier used instead of the file extension.
		#[arg(long)]
		language: Option<String>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
