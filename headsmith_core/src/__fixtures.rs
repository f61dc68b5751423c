use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::*;

pub const PROJECT: &str = "demo";

/// Owns every collaborator a [`HeaderContext`] borrows.
pub struct Harness {
	pub config: HeaderConfig,
	pub rules: RuleTable,
	pub exclusions: Exclusions,
	pub sink: CollectingSink,
	pub prompter: ScriptedPrompter,
	pub clock: FixedClock,
	pub logo: ConfiguredLogo,
	pub project_name: String,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(HeaderConfig::default())
	}

	pub fn from_toml(content: &str) -> Self {
		let config =
			HeaderConfig::from_toml_str(content).unwrap_or_else(|e| panic!("config: {e}"));
		Self::with_config(config)
	}

	pub fn with_config(config: HeaderConfig) -> Self {
		let sink = CollectingSink::new();
		let rules = RuleTable::builtin(&sink);
		assert!(sink.take().is_empty(), "built-in rules emitted diagnostics");
		let exclusions =
			Exclusions::new(&config.refresh.exclude).unwrap_or_else(|e| panic!("exclusions: {e}"));
		let logo = ConfiguredLogo::fixed(config.logo.lines.clone());

		Self {
			config,
			rules,
			exclusions,
			sink,
			prompter: ScriptedPrompter::new(),
			clock: FixedClock(created_at()),
			logo,
			project_name: PROJECT.to_string(),
		}
	}

	#[must_use]
	pub fn with_prompter(mut self, prompter: ScriptedPrompter) -> Self {
		self.prompter = prompter;
		self
	}

	pub fn ctx(&self) -> HeaderContext<'_> {
		HeaderContext {
			config: &self.config,
			rules: &self.rules,
			exclusions: &self.exclusions,
			sink: &self.sink,
			prompter: &self.prompter,
			clock: &self.clock,
			logo: &self.logo,
			project_name: &self.project_name,
		}
	}

	pub fn lifecycle(&self) -> HeaderLifecycle<'_> {
		HeaderLifecycle::new(&self.ctx())
	}

	/// Prefixes for a language, resolved the way the lifecycle does it.
	pub fn prefixes(&self, language_id: &str, extension: &str) -> CommentPrefixes {
		let ctx = self.ctx();
		let style = LanguageRuleResolver::new(&ctx).resolve(language_id, Some(extension));
		CommentPrefixSelector::new(&ctx)
			.select(&style)
			.unwrap_or_else(|e| panic!("prefixes: {e}"))
	}

	/// A freshly rendered header for `document`, without inserting it.
	pub fn render_for(&self, document: &TextDocument) -> String {
		let ctx = self.ctx();
		let file =
			FileMetadata::from_document(document).unwrap_or_else(|e| panic!("metadata: {e}"));
		let style =
			LanguageRuleResolver::new(&ctx).resolve(&file.language_id, Some(&file.extension));
		let prefixes = CommentPrefixSelector::new(&ctx)
			.select(&style)
			.unwrap_or_else(|e| panic!("prefixes: {e}"));
		let builder = HeaderBuilder::new(&ctx);
		let metadata = builder.collect_metadata(file, self.clock.now());
		builder.render(&prefixes, &metadata, style.language.as_deref())
	}

	pub fn locate(
		&self,
		language_id: &str,
		extension: &str,
		document: &TextDocument,
	) -> LocateOutcome {
		let prefixes = self.prefixes(language_id, extension);
		HeaderLocator::new(&self.ctx()).locate(&prefixes, document)
	}
}

fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
	NaiveDate::from_ymd_opt(year, month, day)
		.and_then(|date| date.and_hms_opt(hour, minute, second))
		.unwrap_or_else(|| panic!("invalid fixture instant"))
}

/// 05-03-2024 14:07:09
pub fn created_at() -> NaiveDateTime {
	instant(2024, 3, 5, 14, 7, 9)
}

/// 01-04-2024 09:30:00
pub fn saved_at() -> NaiveDateTime {
	instant(2024, 4, 1, 9, 30, 0)
}

pub fn python_document(content: &str) -> TextDocument {
	TextDocument::from_text(content)
		.with_path("demo.py")
		.with_language_id(Some("python"))
}

pub fn typescript_document(content: &str) -> TextDocument {
	TextDocument::from_text(content)
		.with_path("src/index.ts")
		.with_language_id(Some("typescript"))
}

/// `count` lines of filler code.
pub fn filler(count: usize) -> String {
	(0..count).map(|index| format!("value_{index} = {index}\n")).collect()
}

pub fn write_file(path: &std::path::Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write: {e}"));
}
