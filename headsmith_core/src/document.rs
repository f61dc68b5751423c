use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::HeaderResult;

/// End-of-line style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LineEnding {
	#[default]
	Lf,
	CrLf,
}

impl LineEnding {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lf => "\n",
			Self::CrLf => "\r\n",
		}
	}

	/// The style used by `content`, judged by its first line break.
	pub fn detect(content: &str) -> Self {
		match content.find('\n') {
			Some(index) if index > 0 && content.as_bytes()[index - 1] == b'\r' => Self::CrLf,
			_ => Self::Lf,
		}
	}
}

impl fmt::Display for LineEnding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Lf => f.write_str("LF"),
			Self::CrLf => f.write_str("CRLF"),
		}
	}
}

/// The document collaborator the engine reads from and edits.
///
/// Lines are exposed without their terminators. Each edit call is applied as
/// one atomic operation.
pub trait Document {
	fn line_count(&self) -> usize;

	/// The text of line `index`, without its terminator.
	fn line(&self, index: usize) -> Option<&str>;

	fn line_ending(&self) -> Option<LineEnding>;

	fn is_closed(&self) -> bool;

	fn language_id(&self) -> Option<&str>;

	fn path(&self) -> Option<&Path>;

	fn version(&self) -> Option<u32>;

	/// Insert `text` before line `line`. Every line of `text` must end with
	/// the document's line terminator.
	fn insert(&mut self, line: usize, text: &str);

	/// Replace the lines in `lines` with `text`.
	fn replace(&mut self, lines: Range<usize>, text: &str);
}

/// Byte order mark kept out of the line content.
const BOM: char = '\u{feff}';

/// An in-memory document backed by an optional file path.
///
/// Each line remembers its own terminator so that untouched lines render back
/// byte for byte, even when a file mixes line endings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
	lines: Vec<String>,
	/// Terminator of each line, parallel to `lines`.
	terminators: Vec<LineEnding>,
	/// Style used for inserted lines.
	line_ending: Option<LineEnding>,
	/// Whether the last line ends with its terminator.
	trailing_newline: bool,
	bom: bool,
	path: Option<PathBuf>,
	language_id: Option<String>,
	version: Option<u32>,
	closed: bool,
}

impl TextDocument {
	/// Build a document from text. The line ending used for new lines is
	/// detected from the content, and a leading byte order mark is set aside.
	pub fn from_text(content: &str) -> Self {
		let (bom, content) = match content.strip_prefix(BOM) {
			Some(rest) => (true, rest),
			None => (false, content),
		};
		let line_ending = LineEnding::detect(content);
		let trailing_newline = content.ends_with('\n');

		let mut lines = Vec::new();
		let mut terminators = Vec::new();
		for piece in content.split_inclusive('\n') {
			let (line, terminator) = if let Some(line) = piece.strip_suffix("\r\n") {
				(line, LineEnding::CrLf)
			} else if let Some(line) = piece.strip_suffix('\n') {
				(line, LineEnding::Lf)
			} else {
				(piece, line_ending)
			};
			lines.push(line.to_string());
			terminators.push(terminator);
		}

		Self {
			lines,
			terminators,
			line_ending: Some(line_ending),
			trailing_newline,
			bom,
			path: None,
			language_id: Some(PLAIN_TEXT.to_string()),
			version: Some(1),
			closed: false,
		}
	}

	/// Read a file from disk.
	pub fn open(path: &Path) -> HeaderResult<Self> {
		tracing::debug!(path = %path.display(), "opening document");
		let content = std::fs::read_to_string(path)?;
		Ok(Self::from_text(&content).with_path(path))
	}

	#[must_use]
	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	#[must_use]
	pub fn with_language_id(mut self, language_id: Option<impl Into<String>>) -> Self {
		self.language_id = language_id.map(Into::into);
		self
	}

	#[must_use]
	pub fn with_line_ending(mut self, line_ending: Option<LineEnding>) -> Self {
		self.line_ending = line_ending;
		self
	}

	#[must_use]
	pub fn with_version(mut self, version: Option<u32>) -> Self {
		self.version = version;
		self
	}

	pub fn close(&mut self) {
		self.closed = true;
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	/// True when the source text started with a byte order mark.
	pub fn has_bom(&self) -> bool {
		self.bom
	}

	/// Render the document back to text with every line's own terminator,
	/// the trailing newline state and any byte order mark.
	pub fn text(&self) -> String {
		let mut text = String::new();
		if self.bom {
			text.push(BOM);
		}
		let last = self.lines.len().saturating_sub(1);
		let lines = self.lines.iter().zip(&self.terminators);
		for (index, (line, terminator)) in lines.enumerate() {
			text.push_str(line);
			if index < last || self.trailing_newline {
				text.push_str(terminator.as_str());
			}
		}
		text
	}

	fn split_block(&self, text: &str) -> Vec<String> {
		let eol = self.line_ending.unwrap_or_default().as_str();
		let body = text.strip_suffix(eol).unwrap_or(text);
		body.split(eol).map(ToString::to_string).collect()
	}

	/// Swap `range` for `block`, giving new lines the document's ending. When
	/// lines are replaced, the last new line keeps the terminator of the last
	/// line it replaces.
	fn splice(&mut self, range: Range<usize>, block: Vec<String>) {
		let eol = self.line_ending.unwrap_or_default();
		let mut terminators = vec![eol; block.len()];
		let kept = if range.is_empty() {
			None
		} else {
			self.terminators.get(range.end - 1).copied()
		};
		if let (Some(kept), Some(slot)) = (kept, terminators.last_mut()) {
			*slot = kept;
		}
		self.lines.splice(range.clone(), block);
		self.terminators.splice(range, terminators);
		self.bump_version();
	}

	fn bump_version(&mut self) {
		self.version = self.version.map(|version| version.saturating_add(1));
	}
}

/// Language identifier used when the caller does not know the language.
pub const PLAIN_TEXT: &str = "plaintext";

impl Document for TextDocument {
	fn line_count(&self) -> usize {
		self.lines.len()
	}

	fn line(&self, index: usize) -> Option<&str> {
		self.lines.get(index).map(String::as_str)
	}

	fn line_ending(&self) -> Option<LineEnding> {
		self.line_ending
	}

	fn is_closed(&self) -> bool {
		self.closed
	}

	fn language_id(&self) -> Option<&str> {
		self.language_id.as_deref()
	}

	fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	fn version(&self) -> Option<u32> {
		self.version
	}

	fn insert(&mut self, line: usize, text: &str) {
		if self.lines.is_empty() {
			self.trailing_newline = true;
		}
		let line = line.min(self.lines.len());
		let block = self.split_block(text);
		self.splice(line..line, block);
	}

	fn replace(&mut self, lines: Range<usize>, text: &str) {
		let end = lines.end.min(self.lines.len());
		let start = lines.start.min(end);
		let block = self.split_block(text);
		self.splice(start..end, block);
	}
}
