use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use serde::Deserialize;

use crate::HeaderError;
use crate::HeaderResult;

/// Default number of leading lines inspected when looking for a header. The
/// logo height is added on top of this value.
pub const DEFAULT_SCAN_LINES: usize = 100;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"headsmith.toml",
	".headsmith.toml",
	".config/headsmith.toml",
];

/// Logo rendered when nothing else is configured.
pub const DEFAULT_LOGO: [&str; 5] = [
	r" _   _ ____",
	r"| | | / ___|",
	r"| |_| \___ \",
	r"|  _  |___) |",
	r"|_| |_|____/",
];

/// A comment token override. A bare string is a one-element list.
///
/// ```toml
/// [languages.python]
/// single_line = "#"
/// multi_line = ['"""', '"""']
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum TokenList {
	One(String),
	Many(Vec<String>),
}

impl TokenList {
	pub fn to_vec(&self) -> Vec<String> {
		match self {
			Self::One(token) => vec![token.clone()],
			Self::Many(tokens) => tokens.clone(),
		}
	}
}

/// Per-language overrides and extra lines spliced around the header.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LanguageOverride {
	/// Replaces the rule table's single-line tokens.
	#[serde(default)]
	pub single_line: Option<TokenList>,
	/// Replaces the rule table's multi-line tokens.
	#[serde(default)]
	pub multi_line: Option<TokenList>,
	/// Lines written verbatim before the header.
	#[serde(default)]
	pub prepend: Vec<String>,
	/// Lines written verbatim after the header.
	#[serde(default)]
	pub append: Vec<String>,
}

/// Configuration loaded from a `headsmith.toml` file.
///
/// ```toml
/// project_name = "demo"
///
/// [scan]
/// max_lines = 100
///
/// [header]
/// begin_marker = "BEGIN"
/// end_marker = "END"
///
/// [comments]
/// prefer_single_line = false
///
/// [refresh]
/// on_save = true
/// prompt_to_create = true
/// exclude = ["*.md", "vendor/**"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeaderConfig {
	/// Project name written into the header. Defaults to the name of the
	/// project root directory.
	#[serde(default)]
	pub project_name: Option<String>,
	#[serde(default)]
	pub scan: ScanConfig,
	#[serde(default)]
	pub header: HeaderFormat,
	#[serde(default)]
	pub comments: CommentsConfig,
	/// Overrides keyed by language name. Keys are lowercased on load.
	#[serde(default)]
	pub languages: BTreeMap<String, LanguageOverride>,
	#[serde(default)]
	pub refresh: RefreshConfig,
	#[serde(default)]
	pub logo: LogoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
	/// Base number of lines searched for an existing header.
	pub max_lines: usize,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			max_lines: DEFAULT_SCAN_LINES,
		}
	}
}

/// Literal strings used to render a header.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderFormat {
	pub decoration_open: String,
	pub decoration_close: String,
	pub begin_marker: String,
	pub end_marker: String,
	pub key_separator: String,
	pub block_terminator: String,
	pub end_of_transmission: String,
	pub date_separator: String,
	pub time_separator: String,
	pub time_date_separator: String,
	/// Appended to every comment prefix.
	pub spacing: String,
	/// Write an empty comment line after each multi-line field.
	pub blank_line_after_multiline: bool,
	pub copyright: String,
	pub keys: HeaderKeys,
}

impl Default for HeaderFormat {
	fn default() -> Self {
		Self {
			decoration_open: "+==== ".to_string(),
			decoration_close: " =================+".to_string(),
			begin_marker: "BEGIN".to_string(),
			end_marker: "END".to_string(),
			key_separator: ": ".to_string(),
			block_terminator: "/STOP".to_string(),
			end_of_transmission: "// AR".to_string(),
			date_separator: "-".to_string(),
			time_separator: ":".to_string(),
			time_date_separator: " ".to_string(),
			spacing: " ".to_string(),
			blank_line_after_multiline: true,
			copyright: "(c) Headsmith contributors".to_string(),
			keys: HeaderKeys::default(),
		}
	}
}

/// Key labels for each header field.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderKeys {
	pub logo: String,
	pub project: String,
	pub file: String,
	pub created: String,
	pub last_modified: String,
	pub description: String,
	pub copyright: String,
	pub purpose: String,
}

impl Default for HeaderKeys {
	fn default() -> Self {
		Self {
			logo: "LOGO".to_string(),
			project: "PROJECT".to_string(),
			file: "FILE".to_string(),
			created: "CREATION DATE".to_string(),
			last_modified: "LAST Modified".to_string(),
			description: "DESCRIPTION".to_string(),
			copyright: "COPYRIGHT".to_string(),
			purpose: "PURPOSE".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsConfig {
	/// Use single-line comments even when the language has a multi-line
	/// form.
	#[serde(default)]
	pub prefer_single_line: bool,
	/// Replacement rule source, relative to the project root. The built-in
	/// table is used when absent.
	#[serde(default)]
	pub rules: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
	/// Refresh the last-modified timestamp when a file is saved.
	pub on_save: bool,
	/// Offer to create a header on save when none is found.
	pub prompt_to_create: bool,
	/// Glob patterns matched against the file path, name and extension.
	pub exclude: Vec<String>,
}

impl Default for RefreshConfig {
	fn default() -> Self {
		Self {
			on_save: true,
			prompt_to_create: true,
			exclude: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
	/// Static logo lines.
	pub lines: Vec<String>,
	/// Pick a random logo from `directory` on every build.
	pub random: bool,
	/// Directory of `*.txt` logo files, relative to the project root.
	pub directory: Option<PathBuf>,
}

impl Default for LogoConfig {
	fn default() -> Self {
		Self {
			lines: DEFAULT_LOGO.iter().map(ToString::to_string).collect(),
			random: false,
			directory: None,
		}
	}
}

impl HeaderConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no file exists.
	pub fn load(root: &Path) -> HeaderResult<Option<HeaderConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		Self::from_toml_str(&content).map(Some)
	}

	/// Load the discovered config or fall back to the compiled defaults.
	pub fn load_or_default(root: &Path) -> HeaderResult<HeaderConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn from_toml_str(content: &str) -> HeaderResult<HeaderConfig> {
		let mut config: HeaderConfig =
			toml::from_str(content).map_err(|e| HeaderError::ConfigParse(e.to_string()))?;
		config.languages = std::mem::take(&mut config.languages)
			.into_iter()
			.map(|(name, entry)| (name.trim().to_ascii_lowercase(), entry))
			.collect();

		Ok(config)
	}

	/// The override block for a resolved language name, if configured.
	pub fn language(&self, name: &str) -> Option<&LanguageOverride> {
		self.languages.get(&name.to_ascii_lowercase())
	}

	/// The project name, falling back to the root directory name.
	pub fn project_name(&self, root: &Path) -> String {
		if let Some(name) = self.project_name.as_deref().map(str::trim) {
			if !name.is_empty() {
				return name.to_string();
			}
		}

		root.canonicalize()
			.ok()
			.as_deref()
			.unwrap_or(root)
			.file_name()
			.map_or_else(
				|| "project".to_string(),
				|name| name.to_string_lossy().into_owned(),
			)
	}

	/// Compile the refresh exclusion globs, matching paths relative to
	/// `root`.
	pub fn exclusions(&self, root: &Path) -> HeaderResult<Exclusions> {
		Ok(Exclusions::new(&self.refresh.exclude)?.with_root(root))
	}
}

/// Compiled exclusion globs.
#[derive(Debug, Clone)]
pub struct Exclusions {
	set: GlobSet,
	/// Paths under this directory are matched relative to it.
	root: Option<PathBuf>,
}

impl Default for Exclusions {
	fn default() -> Self {
		Self {
			set: GlobSet::empty(),
			root: None,
		}
	}
}

impl Exclusions {
	pub fn new(patterns: &[String]) -> HeaderResult<Self> {
		let mut builder = GlobSetBuilder::new();
		for pattern in patterns {
			let glob = Glob::new(pattern).map_err(|e| {
				HeaderError::InvalidGlob {
					pattern: pattern.clone(),
					reason: e.to_string(),
				}
			})?;
			builder.add(glob);
		}

		let set = builder.build().map_err(|e| {
			HeaderError::InvalidGlob {
				pattern: patterns.join(", "),
				reason: e.to_string(),
			}
		})?;

		Ok(Self { set, root: None })
	}

	#[must_use]
	pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = Some(root.into());
		self
	}

	/// Returns true if the path, its file name, or its extension matches one
	/// of the patterns.
	pub fn is_excluded(&self, path: &Path) -> bool {
		if self.set.is_empty() {
			return false;
		}

		let path = self
			.root
			.as_deref()
			.and_then(|root| path.strip_prefix(root).ok())
			.unwrap_or(path);
		let normalized = path.to_string_lossy().replace('\\', "/");
		if self.set.is_match(&normalized) {
			return true;
		}

		if path.file_name().is_some_and(|name| self.set.is_match(name)) {
			return true;
		}

		path.extension().is_some_and(|ext| self.set.is_match(ext))
	}
}
