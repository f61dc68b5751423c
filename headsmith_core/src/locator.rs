use std::fmt;

use serde::Serialize;

use crate::HeaderContext;
use crate::builder::decoration_line;
use crate::builder::strip_terminator;
use crate::config::HeaderFormat;
use crate::diagnostics::Component;
use crate::diagnostics::DiagnosticSink;
use crate::document::Document;
use crate::prefix::CommentPrefixes;

/// Zero-based indices of the opener and closer decoration lines of a
/// located header. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderBoundary {
	pub start: usize,
	pub end: usize,
}

/// Why a header was classified as broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrokenHeader {
	/// A closer decoration appeared before any opener.
	StrayCloser { line: usize },
	/// A second opener appeared before the first one was closed.
	DuplicateOpener { first: usize, second: usize },
}

impl fmt::Display for BrokenHeader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::StrayCloser { line } => {
				write!(f, "closing decoration on line {} has no opener", line + 1)
			}
			Self::DuplicateOpener { first, second } => {
				write!(
					f,
					"opening decoration on line {} repeats the one on line {}",
					second + 1,
					first + 1
				)
			}
		}
	}
}

/// Result of scanning a document for a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocateOutcome {
	/// Opener and closer found.
	Complete(HeaderBoundary),
	/// No header inside the scan window.
	Absent,
	/// Decoration lines found in an impossible order.
	Broken(BrokenHeader),
	/// The document could not be scanned.
	Aborted,
}

impl LocateOutcome {
	/// Tri-state view: `Some(true)` for a complete header, `Some(false)` for
	/// an absent or broken one, `None` when the scan was aborted.
	pub fn presence(&self) -> Option<bool> {
		match self {
			Self::Complete(_) => Some(true),
			Self::Absent | Self::Broken(_) => Some(false),
			Self::Aborted => None,
		}
	}

	pub fn boundary(&self) -> Option<HeaderBoundary> {
		match self {
			Self::Complete(boundary) => Some(*boundary),
			_ => None,
		}
	}
}

/// Scans the leading lines of a document for header decoration lines.
pub struct HeaderLocator<'a> {
	format: &'a HeaderFormat,
	sink: &'a dyn DiagnosticSink,
	project_name: &'a str,
	max_scan: usize,
}

impl<'a> HeaderLocator<'a> {
	pub fn new(ctx: &HeaderContext<'a>) -> Self {
		Self {
			format: &ctx.config.header,
			sink: ctx.sink,
			project_name: ctx.project_name,
			max_scan: ctx.config.scan.max_lines + ctx.logo.max_height(),
		}
	}

	/// Number of lines searched for an opener, and for a closer once the
	/// opener is found.
	pub fn max_scan(&self) -> usize {
		self.max_scan
	}

	pub fn locate(&self, prefixes: &CommentPrefixes, document: &dyn Document) -> LocateOutcome {
		if document.is_closed() {
			self.sink.warning(
				Component::HeaderLocator,
				"document is closed, header scan aborted",
			);
			return LocateOutcome::Aborted;
		}

		let eol = document.line_ending().unwrap_or_default();
		let opener = decoration_line(
			self.format,
			&prefixes.middle,
			&self.format.begin_marker,
			self.project_name,
			eol,
		);
		let closer = decoration_line(
			self.format,
			&prefixes.middle,
			&self.format.end_marker,
			self.project_name,
			eol,
		);
		let opener = strip_terminator(&opener, eol);
		let closer = strip_terminator(&closer, eol);

		let line_count = document.line_count();
		let mut start: Option<usize> = None;
		let mut index = 0;

		loop {
			let limit = match start {
				None => self.max_scan.min(line_count),
				Some(first) => (first + 1 + self.max_scan).min(line_count),
			};
			if index >= limit {
				break;
			}
			let Some(line) = document.line(index) else {
				break;
			};
			let line = line.strip_suffix('\r').unwrap_or(line);
			let is_opener = line == opener;
			let is_closer = line == closer;

			match (start, is_opener, is_closer) {
				(None, true, _) => start = Some(index),
				(None, false, true) => {
					return self.broken(BrokenHeader::StrayCloser { line: index });
				}
				(Some(first), _, true) => {
					let boundary = HeaderBoundary {
						start: first,
						end: index,
					};
					self.sink.debug(
						Component::HeaderLocator,
						&format!("header found on lines {}-{}", first + 1, index + 1),
					);
					return LocateOutcome::Complete(boundary);
				}
				(Some(first), true, false) => {
					return self.broken(BrokenHeader::DuplicateOpener {
						first,
						second: index,
					});
				}
				_ => {}
			}

			index += 1;
		}

		let message = match start {
			Some(first) => {
				format!(
					"header opened on line {} is not closed within {} lines",
					first + 1,
					self.max_scan
				)
			}
			None => format!("no header found in the first {} lines", self.max_scan),
		};
		self.sink.info(Component::HeaderLocator, &message);
		LocateOutcome::Absent
	}

	fn broken(&self, reason: BrokenHeader) -> LocateOutcome {
		self.sink
			.warning(Component::HeaderLocator, &format!("broken header: {reason}"));
		LocateOutcome::Broken(reason)
	}
}
