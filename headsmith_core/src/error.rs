use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum HeaderError {
	#[error(transparent)]
	#[diagnostic(code(headsmith::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(headsmith::config_parse),
		help("check that headsmith.toml is valid TOML with [header], [comments] and [refresh] sections")
	)]
	ConfigParse(String),

	#[error("failed to load comment rules from `{source_name}`: {reason}")]
	#[diagnostic(
		code(headsmith::rule_load),
		help("the rule source must be a JSON object with a top-level `langs` array")
	)]
	RuleLoad { source_name: String, reason: String },

	#[error("comment rule #{index} was skipped: {reason}")]
	#[diagnostic(code(headsmith::invalid_rule))]
	InvalidRule { index: usize, reason: String },

	#[error("no comment style found for language `{language}` (extension `{extension}`)")]
	#[diagnostic(
		code(headsmith::unresolved_language),
		help("add a rule for this language or an override under [languages.<name>]")
	)]
	UnresolvedLanguage { language: String, extension: String },

	#[error("document metadata is missing the `{field}` field")]
	#[diagnostic(code(headsmith::metadata_corruption))]
	MetadataCorruption { field: &'static str },

	#[error("document is closed or unavailable")]
	#[diagnostic(code(headsmith::document_unavailable))]
	DocumentUnavailable,

	#[error("no header boundary was located in the document")]
	#[diagnostic(code(headsmith::boundary_missing))]
	BoundaryMissing,

	#[error("the `{key}` line was not found between lines {start} and {end}")]
	#[diagnostic(
		code(headsmith::key_line_not_found),
		help("the header was edited by hand; restore the `{key}` line or remove the header")
	)]
	KeyLineNotFound {
		key: String,
		start: usize,
		end: usize,
	},

	#[error("a choice prompt was requested without any options")]
	#[diagnostic(code(headsmith::empty_choice))]
	EmptyChoice,

	#[error("failed to read logo directory `{path}`: {reason}")]
	#[diagnostic(
		code(headsmith::logo_directory),
		help("point [logo].directory at a folder containing `*.txt` logo files")
	)]
	LogoDirectory { path: String, reason: String },

	#[error("invalid exclusion glob `{pattern}`: {reason}")]
	#[diagnostic(code(headsmith::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },
}

pub type HeaderResult<T> = Result<T, HeaderError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
