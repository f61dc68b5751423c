use std::collections::BTreeSet;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use dialoguer::Confirm;
use dialoguer::Input;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use headsmith_cli::Commands;
use headsmith_cli::HeadsmithCli;
use headsmith_cli::OutputFormat;
use headsmith_core::CONFIG_FILE_CANDIDATES;
use headsmith_core::CommentPrefixSelector;
use headsmith_core::ConfiguredLogo;
use headsmith_core::Exclusions;
use headsmith_core::HeaderConfig;
use headsmith_core::HeaderContext;
use headsmith_core::HeaderError;
use headsmith_core::LanguageRuleResolver;
use headsmith_core::LifecycleOutcome;
use headsmith_core::LocateOutcome;
use headsmith_core::Operation;
use headsmith_core::PLAIN_TEXT;
use headsmith_core::Prompter;
use headsmith_core::RuleTable;
use headsmith_core::SystemClock;
use headsmith_core::TextField;
use headsmith_core::TracingSink;
use headsmith_core::detect_file;
use headsmith_core::discover_files;
use headsmith_core::run_file;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "HEADSMITH_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = HeadsmithCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Inject {
			files,
			description,
			purpose,
			language,
			dry_run,
		}) => {
			let prompter =
				TerminalPrompter::new(&args).with_answers(description.clone(), purpose.clone());
			run_files(
				&args,
				prompter,
				files,
				Operation::Inject,
				language.as_deref(),
				*dry_run,
			)
		}
		Some(Commands::Refresh { files, dry_run }) => {
			let prompter = TerminalPrompter::new(&args);
			run_files(&args, prompter, files, Operation::Refresh, None, *dry_run)
		}
		Some(Commands::Check { paths, format }) => run_check(&args, paths, *format),
		Some(Commands::Watch { paths }) => run_watch(&args, paths),
		Some(Commands::Languages { format }) => run_languages(&args, *format),
		Some(Commands::Resolve { file, language }) => {
			run_resolve(&args, file, language.as_deref())
		}
		None => {
			eprintln!("No subcommand specified. Run `headsmith --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<HeaderError>() {
			Ok(header_err) => {
				let report: miette::Report = (*header_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr, filtered by `HEADSMITH_LOG` (default `warn`, or `info`
/// with `--verbose`).
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "info" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &HeadsmithCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Prompts on the terminal when stdin is interactive. Answers given on the
/// command line are used without asking.
#[derive(Debug, Clone, Default)]
struct TerminalPrompter {
	interactive: bool,
	assume_yes: bool,
	description: Option<String>,
	purpose: Option<String>,
}

impl TerminalPrompter {
	fn new(args: &HeadsmithCli) -> Self {
		Self {
			interactive: !args.non_interactive && std::io::stdin().is_terminal(),
			assume_yes: args.yes,
			description: None,
			purpose: None,
		}
	}

	fn with_answers(mut self, description: Option<String>, purpose: Option<String>) -> Self {
		self.description = description;
		self.purpose = purpose;
		self
	}
}

impl Prompter for TerminalPrompter {
	fn text(&self, field: TextField, message: &str) -> Option<String> {
		let preset = match field {
			TextField::Description => &self.description,
			TextField::Purpose => &self.purpose,
		};
		if preset.is_some() {
			return preset.clone();
		}
		if !self.interactive {
			tracing::debug!(field = field.label(), "prompt skipped in non-interactive mode");
			return None;
		}

		Input::<String>::with_theme(&ColorfulTheme::default())
			.with_prompt(message)
			.allow_empty(true)
			.interact_text()
			.ok()
	}

	fn choose(&self, message: &str, options: &[String]) -> Option<usize> {
		if !self.interactive {
			return None;
		}

		Select::with_theme(&ColorfulTheme::default())
			.with_prompt(message)
			.items(options)
			.default(0)
			.interact_opt()
			.ok()
			.flatten()
	}

	fn confirm(&self, message: &str) -> bool {
		if self.assume_yes {
			return true;
		}
		if !self.interactive {
			return false;
		}

		Confirm::with_theme(&ColorfulTheme::default())
			.with_prompt(message)
			.default(true)
			.interact_opt()
			.ok()
			.flatten()
			.unwrap_or(false)
	}
}

/// Everything loaded from the project root that a header run borrows.
struct Workspace {
	root: PathBuf,
	config: HeaderConfig,
	rules: RuleTable,
	exclusions: Exclusions,
	logo: ConfiguredLogo,
	project_name: String,
	prompter: TerminalPrompter,
}

impl Workspace {
	fn load(
		args: &HeadsmithCli,
		prompter: TerminalPrompter,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let root = resolve_root(args);
		let config = HeaderConfig::load_or_default(&root)?;
		let rules = RuleTable::for_config(&config, &root, &TracingSink);
		let exclusions = config.exclusions(&root)?;
		let logo = ConfiguredLogo::from_config(&config.logo, &root)?;
		let project_name = config.project_name(&root);

		tracing::info!(
			rules = rules.len(),
			root = %root.display(),
			"loaded workspace for project `{project_name}`"
		);

		Ok(Self {
			root,
			config,
			rules,
			exclusions,
			logo,
			project_name,
			prompter,
		})
	}

	fn ctx(&self) -> HeaderContext<'_> {
		HeaderContext {
			config: &self.config,
			rules: &self.rules,
			exclusions: &self.exclusions,
			sink: &TracingSink,
			prompter: &self.prompter,
			clock: &SystemClock,
			logo: &self.logo,
			project_name: &self.project_name,
		}
	}

	fn resolve_file(&self, file: &Path) -> PathBuf {
		if file.is_absolute() {
			file.to_path_buf()
		} else {
			self.root.join(file)
		}
	}

	/// Files whose modification requires a reload.
	fn sources(&self) -> Vec<PathBuf> {
		let mut sources: Vec<PathBuf> = CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| self.root.join(candidate))
			.collect();
		if let Some(rules) = &self.config.comments.rules {
			sources.push(self.root.join(rules));
		}
		sources
	}

	fn has_rule(&self, path: &Path) -> bool {
		path.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| self.rules.find(PLAIN_TEXT, Some(ext)).is_some())
	}
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<14} {value}");
}

const SAMPLE_CONFIG: &str = "# headsmith configuration\n\n[scan]\n# Lines searched for an \
                             existing header, on top of the logo height.\nmax_lines = \
                             100\n\n[comments]\n# Use `//` instead of `/* */` where both \
                             exist.\nprefer_single_line = false\n\n# Per-language overrides \
                             and extra lines around the header.\n# [languages.python]\n# \
                             prepend = [\"# -*- coding: utf-8 -*-\"]\n\n[refresh]\non_save = \
                             true\nprompt_to_create = true\nexclude = [\"*.md\", \"*.json\", \
                             \"*.lock\"]\n";

fn run_init(args: &HeadsmithCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = HeaderConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let project_name = HeaderConfig::default().project_name(&root);
	let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
	let content = format!("project_name = {project_name:?}\n\n{SAMPLE_CONFIG}");
	std::fs::write(&config_path, content)?;
	println!("Created {}", config_path.display());

	println!();
	println!("Next steps:");
	println!("  1. Adjust {} to taste", config_path.display());
	println!("  2. Run `headsmith inject <FILES>` to add headers");
	println!("  3. Run `headsmith watch` to keep timestamps current");

	Ok(())
}

/// Print one line describing a lifecycle outcome. Returns true when the run
/// was aborted.
fn report_outcome(rel: &str, outcome: &LifecycleOutcome, show_skipped: bool) -> bool {
	match outcome {
		LifecycleOutcome::Inserted { lines, .. } => {
			println!("{} {rel} ({lines} lines)", colored!("inserted", green));
		}
		LifecycleOutcome::Refreshed { line } => {
			println!("{} {rel} (line {})", colored!("refreshed", green), line + 1);
		}
		LifecycleOutcome::Skipped(reason) => {
			if show_skipped {
				println!("{} {rel}: {reason}", colored!("skipped", yellow));
			}
		}
		LifecycleOutcome::Aborted(error) => {
			eprintln!("{} {rel}: {error}", colored!("error:", red));
			return true;
		}
	}
	false
}

fn run_files(
	args: &HeadsmithCli,
	prompter: TerminalPrompter,
	files: &[PathBuf],
	operation: Operation,
	language: Option<&str>,
	dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let workspace = Workspace::load(args, prompter)?;
	let ctx = workspace.ctx();
	let mut changed = 0;
	let mut failed = 0;

	for file in files {
		let path = workspace.resolve_file(file);
		let rel = make_relative(&path, &workspace.root);

		let run = match run_file(&ctx, &path, operation, language) {
			Ok(run) => run,
			Err(e) => {
				eprintln!("{} {rel}: {e}", colored!("error:", red));
				failed += 1;
				continue;
			}
		};

		if report_outcome(&rel, &run.outcome, true) {
			failed += 1;
		}

		if run.changed() {
			changed += 1;
			if dry_run {
				print_diff(&run.original, &run.updated);
			} else {
				run.write()?;
			}
		}
	}

	if dry_run {
		println!("Dry run: {changed} file(s) would change.");
	} else if args.verbose {
		println!("Updated {changed} file(s).");
	}

	if failed > 0 {
		return Err(format!("{failed} file(s) could not be processed").into());
	}

	Ok(())
}

#[derive(Debug, Serialize)]
struct MissingHeader {
	file: String,
	#[serde(flatten)]
	outcome: LocateOutcome,
}

#[derive(Debug, Serialize)]
struct CheckFailure {
	file: String,
	message: String,
}

fn describe_outcome(outcome: &LocateOutcome) -> String {
	match outcome {
		LocateOutcome::Complete(boundary) => {
			format!("lines {}-{}", boundary.start + 1, boundary.end + 1)
		}
		LocateOutcome::Absent => "no header".to_string(),
		LocateOutcome::Broken(reason) => format!("broken header: {reason}"),
		LocateOutcome::Aborted => "could not be scanned".to_string(),
	}
}

fn run_check(
	args: &HeadsmithCli,
	paths: &[PathBuf],
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let prompter = TerminalPrompter {
		assume_yes: args.yes,
		..TerminalPrompter::default()
	};
	let workspace = Workspace::load(args, prompter)?;
	let ctx = workspace.ctx();
	let paths = if paths.is_empty() {
		vec![workspace.root.clone()]
	} else {
		paths.to_vec()
	};
	let files = discover_files(&ctx, &workspace.root, &paths)?;

	let mut missing = Vec::new();
	let mut failures = Vec::new();
	for path in &files {
		let rel = make_relative(path, &workspace.root);
		match detect_file(&ctx, path, None) {
			Ok(outcome @ LocateOutcome::Complete(_)) => {
				if args.verbose {
					println!("  {rel}: {}", describe_outcome(&outcome));
				}
			}
			Ok(outcome) => missing.push(MissingHeader { file: rel, outcome }),
			Err(e) => {
				failures.push(CheckFailure {
					file: rel,
					message: e.to_string(),
				});
			}
		}
	}

	let ok = missing.is_empty() && failures.is_empty();
	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": ok,
				"checked": files.len(),
				"missing": missing,
				"errors": failures,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if ok {
				println!(
					"Check passed: all {} file(s) have a header.",
					files.len()
				);
			} else {
				eprintln!("Check failed.");
				if !missing.is_empty() {
					eprintln!();
					eprintln!("Missing headers:");
					for entry in &missing {
						eprintln!("  {} ({})", entry.file, describe_outcome(&entry.outcome));
					}
				}
				if !failures.is_empty() {
					eprintln!();
					eprintln!("Errors:");
					for failure in &failures {
						eprintln!("  {}: {}", failure.file, failure.message);
					}
				}
				eprintln!();
				eprintln!(
					"{} of {} file(s) need attention. Run `headsmith inject <FILES>` to fix.",
					missing.len() + failures.len(),
					files.len()
				);
			}
		}
	}

	if !ok {
		process::exit(1);
	}

	Ok(())
}

fn run_watch(args: &HeadsmithCli, paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
	let prompter = TerminalPrompter::new(args);
	let mut workspace = Workspace::load(args, prompter.clone())?;
	let targets: Vec<PathBuf> = if paths.is_empty() {
		vec![workspace.root.clone()]
	} else {
		paths.iter().map(|path| workspace.resolve_file(path)).collect()
	};

	let (tx, rx) = mpsc::channel::<Vec<PathBuf>>();
	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(event.paths);
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&workspace.root, notify::RecursiveMode::Recursive)?;
	println!("Watching for file changes... (press Ctrl+C to stop)");

	// Content last written by this loop, used to ignore our own writes.
	let mut written: HashMap<PathBuf, String> = HashMap::new();

	loop {
		let mut changed: BTreeSet<PathBuf> = rx.recv()?.into_iter().collect();
		// Debounce: drain additional events within 200ms.
		while let Ok(paths) = rx.recv_timeout(Duration::from_millis(200)) {
			changed.extend(paths);
		}

		let sources = workspace.sources();
		if changed.iter().any(|path| sources.contains(path)) {
			match Workspace::load(args, prompter.clone()) {
				Ok(reloaded) => {
					workspace = reloaded;
					println!("Reloaded configuration and comment rules.");
				}
				Err(e) => eprintln!("{} {e}", colored!("error:", red)),
			}
		}

		for path in changed {
			if sources.contains(&path)
				|| !path.is_file()
				|| !targets.iter().any(|target| path.starts_with(target))
				|| !workspace.has_rule(&path)
			{
				continue;
			}

			let Ok(content) = std::fs::read_to_string(&path) else {
				continue;
			};
			if written.get(&path) == Some(&content) {
				continue;
			}

			refresh_watched(args, &workspace, &path, &mut written);
		}
	}
}

fn refresh_watched(
	args: &HeadsmithCli,
	workspace: &Workspace,
	path: &Path,
	written: &mut HashMap<PathBuf, String>,
) {
	let rel = make_relative(path, &workspace.root);
	let run = match run_file(&workspace.ctx(), path, Operation::Refresh, None) {
		Ok(run) => run,
		Err(e) => {
			eprintln!("{} {rel}: {e}", colored!("error:", red));
			return;
		}
	};

	report_outcome(&rel, &run.outcome, args.verbose);
	if !run.changed() {
		return;
	}

	match run.write() {
		Ok(()) => {
			written.insert(path.to_path_buf(), run.updated);
		}
		Err(e) => eprintln!("{} {rel}: {e}", colored!("error:", red)),
	}
}

fn run_languages(
	args: &HeadsmithCli,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let workspace = Workspace::load(args, TerminalPrompter::default())?;

	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&*workspace.rules)?);
		}
		OutputFormat::Text => {
			if workspace.rules.is_empty() {
				println!("No comment rules loaded.");
				return Ok(());
			}

			let heading = format!(
				"{:<18} {:<10} {:<14} {}",
				"LANGUAGE", "SINGLE", "MULTI", "EXTENSIONS"
			);
			println!("{}", colored!(heading, bold));
			for rule in workspace.rules.iter() {
				let single = rule.single_line.join(" ");
				let multi = rule.multi_line.join(" ");
				for language in &rule.languages {
					let extensions: Vec<String> = rule
						.extensions_for(language)
						.iter()
						.map(|ext| format!(".{ext}"))
						.collect();
					println!(
						"{language:<18} {single:<10} {multi:<14} {}",
						extensions.join(" ")
					);
				}
			}
		}
	}

	Ok(())
}

fn run_resolve(
	args: &HeadsmithCli,
	file: &Path,
	language: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
	let workspace = Workspace::load(args, TerminalPrompter::new(args))?;
	let ctx = workspace.ctx();
	let path = workspace.resolve_file(file);
	let extension = path
		.extension()
		.map(|ext| ext.to_string_lossy().into_owned());

	let style = LanguageRuleResolver::new(&ctx)
		.resolve(language.unwrap_or(PLAIN_TEXT), extension.as_deref());
	let prefixes = CommentPrefixSelector::new(&ctx).select(&style)?;
	let or_none = |tokens: &[String]| {
		if tokens.is_empty() {
			"none".to_string()
		} else {
			tokens.join(" ")
		}
	};

	print_field("File", make_relative(&path, &workspace.root));
	print_field("Language", style.language_name());
	print_field("Single-line", or_none(&style.single_line));
	print_field("Multi-line", or_none(&style.multi_line));
	print_field("Opener", format!("{:?}", prefixes.opener));
	print_field("Middle", format!("{:?}", prefixes.middle));
	print_field("Closer", format!("{:?}", prefixes.closer));

	if path.is_file() {
		let outcome = detect_file(&ctx, &path, language)?;
		print_field("Header", describe_outcome(&outcome));
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
