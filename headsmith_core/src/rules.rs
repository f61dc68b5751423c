use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;

use crate::HeaderContext;
use crate::HeaderError;
use crate::config::HeaderConfig;
use crate::diagnostics::Component;
use crate::diagnostics::DiagnosticSink;

/// The rule table shipped with the crate.
pub const BUILTIN_RULES: &str = include_str!("languages.json");

/// One entry of the comment rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentStyleRule {
	/// Lowercased language identifiers, in declared order.
	pub languages: Vec<String>,
	/// Normalized extensions (lowercase, no leading dot) per language.
	pub extensions: BTreeMap<String, Vec<String>>,
	pub single_line: Vec<String>,
	/// Empty, or `[opener, closer]`, or `[opener, middle, closer]`.
	pub multi_line: Vec<String>,
	/// Ask which single-line token to use when several exist.
	pub prompt_comment_opening_type: bool,
}

impl CommentStyleRule {
	/// Extensions registered under `language`.
	pub fn extensions_for(&self, language: &str) -> &[String] {
		self.extensions.get(language).map_or(&[], Vec::as_slice)
	}
}

#[derive(Debug, Deserialize)]
struct RawRuleSource {
	langs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
	langs: Vec<String>,
	#[serde(default)]
	file_extensions: BTreeMap<String, Vec<String>>,
	#[serde(default)]
	single_line: Vec<String>,
	#[serde(default)]
	multi_line: Vec<String>,
	#[serde(default, rename = "prompt_comment_opening_type")]
	prompt_comment_opening_type: bool,
}

/// Lowercase an extension and strip any leading dots.
pub fn normalize_extension(extension: &str) -> String {
	extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// A validated rule table, indexed by language and extension.
///
/// The table dereferences to its rules in declared order.
#[derive(Debug, Clone, Default, Deref)]
pub struct RuleTable {
	#[deref]
	rules: Vec<CommentStyleRule>,
	/// Language identifier to the first rule declaring it.
	language_index: HashMap<String, usize>,
	/// Extension to the first rule and language registering it.
	extension_index: HashMap<String, (usize, String)>,
}

impl RuleTable {
	/// Build the index for an already validated list of rules.
	pub fn from_rules(rules: Vec<CommentStyleRule>) -> Self {
		let mut language_index = HashMap::new();
		let mut extension_index = HashMap::new();

		for (index, rule) in rules.iter().enumerate() {
			for language in &rule.languages {
				language_index.entry(language.clone()).or_insert(index);
			}
			for language in &rule.languages {
				for extension in rule.extensions_for(language) {
					extension_index
						.entry(extension.clone())
						.or_insert_with(|| (index, language.clone()));
				}
			}
		}

		Self {
			rules,
			language_index,
			extension_index,
		}
	}

	/// The table compiled into the crate.
	pub fn builtin(sink: &dyn DiagnosticSink) -> Self {
		Self::from_json(BUILTIN_RULES, "built-in rules", sink)
	}

	/// Read a rule source from disk. Failures degrade to an empty table.
	pub fn load(path: &Path, sink: &dyn DiagnosticSink) -> Self {
		tracing::debug!(path = %path.display(), "loading comment rules");
		match std::fs::read_to_string(path) {
			Ok(content) => Self::from_json(&content, &path.display().to_string(), sink),
			Err(e) => {
				let error = HeaderError::RuleLoad {
					source_name: path.display().to_string(),
					reason: e.to_string(),
				};
				sink.error(Component::RuleResolver, &error.to_string());
				Self::default()
			}
		}
	}

	/// The table selected by `[comments].rules`, relative to `root`, or the
	/// built-in table.
	pub fn for_config(config: &HeaderConfig, root: &Path, sink: &dyn DiagnosticSink) -> Self {
		match &config.comments.rules {
			Some(path) => Self::load(&root.join(path), sink),
			None => Self::builtin(sink),
		}
	}

	/// Parse and validate a JSON rule source. A malformed top level yields an
	/// empty table; malformed entries are skipped individually.
	pub fn from_json(content: &str, source_name: &str, sink: &dyn DiagnosticSink) -> Self {
		let source: RawRuleSource = match serde_json::from_str(content) {
			Ok(source) => source,
			Err(e) => {
				let error = HeaderError::RuleLoad {
					source_name: source_name.to_string(),
					reason: e.to_string(),
				};
				sink.error(Component::RuleResolver, &error.to_string());
				return Self::default();
			}
		};

		let mut rules = Vec::with_capacity(source.langs.len());
		for (index, value) in source.langs.into_iter().enumerate() {
			let validated = serde_json::from_value::<RawRule>(value)
				.map_err(|e| e.to_string())
				.and_then(|raw| validate_rule(raw, index, sink));

			match validated {
				Ok(rule) => rules.push(rule),
				Err(reason) => {
					let error = HeaderError::InvalidRule { index, reason };
					sink.warning(Component::RuleResolver, &error.to_string());
				}
			}
		}

		Self::from_rules(rules)
	}

	/// Find the winning rule for a language identifier and extension,
	/// returning its index and the matched language name.
	///
	/// Equivalent to walking the table in order where, inside each rule, a
	/// language match is checked before any extension match.
	pub fn find(&self, language_id: &str, extension: Option<&str>) -> Option<(usize, &str)> {
		let language_id = language_id.trim().to_ascii_lowercase();
		let by_language = self.language_index.get(&language_id).copied();
		let by_extension = extension
			.map(normalize_extension)
			.filter(|ext| !ext.is_empty())
			.and_then(|ext| self.extension_index.get(&ext));

		match (by_language, by_extension) {
			(Some(lang_idx), Some((ext_idx, name))) if *ext_idx < lang_idx => {
				Some((*ext_idx, name.as_str()))
			}
			(Some(lang_idx), _) => {
				let name = self.rules[lang_idx]
					.languages
					.iter()
					.find(|name| **name == language_id)?;
				Some((lang_idx, name.as_str()))
			}
			(None, Some((ext_idx, name))) => Some((*ext_idx, name.as_str())),
			(None, None) => None,
		}
	}
}

fn validate_rule(
	raw: RawRule,
	index: usize,
	sink: &dyn DiagnosticSink,
) -> Result<CommentStyleRule, String> {
	let languages: Vec<String> = raw
		.langs
		.iter()
		.map(|lang| lang.trim().to_ascii_lowercase())
		.collect();

	if languages.is_empty() {
		return Err("no language identifiers".to_string());
	}
	if languages.iter().any(String::is_empty) {
		return Err("empty language identifier".to_string());
	}
	if !matches!(raw.multi_line.len(), 0 | 2 | 3) {
		return Err(format!(
			"multiLine must hold 2 or 3 tokens, found {}",
			raw.multi_line.len()
		));
	}
	if raw
		.single_line
		.iter()
		.chain(&raw.multi_line)
		.any(|token| token.is_empty())
	{
		return Err("empty comment token".to_string());
	}

	let mut extensions = BTreeMap::new();
	for (language, list) in raw.file_extensions {
		let language = language.trim().to_ascii_lowercase();
		if !languages.contains(&language) {
			sink.warning(
				Component::RuleResolver,
				&format!(
					"rule #{index}: extensions registered for undeclared language `{language}` are \
					 ignored"
				),
			);
			continue;
		}

		let normalized: Vec<String> = list
			.iter()
			.map(|ext| normalize_extension(ext))
			.filter(|ext| !ext.is_empty())
			.collect();
		extensions.insert(language, normalized);
	}

	Ok(CommentStyleRule {
		languages,
		extensions,
		single_line: raw.single_line,
		multi_line: raw.multi_line,
		prompt_comment_opening_type: raw.prompt_comment_opening_type,
	})
}

/// The comment tokens chosen for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedCommentStyle {
	/// Matched language name, `None` when no rule matched.
	pub language: Option<String>,
	pub single_line: Vec<String>,
	pub multi_line: Vec<String>,
	pub prompt_comment_opening_type: bool,
}

impl ResolvedCommentStyle {
	pub fn is_resolved(&self) -> bool {
		self.language.is_some()
	}

	/// The language name, or `"unresolved"`.
	pub fn language_name(&self) -> &str {
		self.language.as_deref().unwrap_or("unresolved")
	}
}

/// Maps a language identifier and extension to a comment style.
pub struct LanguageRuleResolver<'a> {
	rules: &'a RuleTable,
	config: &'a HeaderConfig,
	sink: &'a dyn DiagnosticSink,
}

impl<'a> LanguageRuleResolver<'a> {
	pub fn new(ctx: &HeaderContext<'a>) -> Self {
		Self {
			rules: ctx.rules,
			config: ctx.config,
			sink: ctx.sink,
		}
	}

	/// Resolve the comment style, then apply any configured override for the
	/// matched language. An unmatched document yields an empty style.
	pub fn resolve(&self, language_id: &str, extension: Option<&str>) -> ResolvedCommentStyle {
		let Some((index, language)) = self.rules.find(language_id, extension) else {
			let error = HeaderError::UnresolvedLanguage {
				language: language_id.to_string(),
				extension: extension.map(normalize_extension).unwrap_or_default(),
			};
			self.sink
				.warning(Component::RuleResolver, &error.to_string());
			return ResolvedCommentStyle::default();
		};

		let rule = &self.rules[index];
		let mut style = ResolvedCommentStyle {
			language: Some(language.to_string()),
			single_line: rule.single_line.clone(),
			multi_line: rule.multi_line.clone(),
			prompt_comment_opening_type: rule.prompt_comment_opening_type,
		};
		self.sink.debug(
			Component::RuleResolver,
			&format!("`{language_id}` resolved to `{language}` (rule #{index})"),
		);

		if let Some(entry) = self.config.language(language) {
			if let Some(single_line) = &entry.single_line {
				style.single_line = single_line.to_vec();
			}
			if let Some(multi_line) = &entry.multi_line {
				style.multi_line = multi_line.to_vec();
			}
		}

		style
	}
}
