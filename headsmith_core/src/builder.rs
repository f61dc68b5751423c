use chrono::Datelike;
use chrono::NaiveDateTime;
use chrono::Timelike;

use crate::HeaderContext;
use crate::config::HeaderConfig;
use crate::config::HeaderFormat;
use crate::diagnostics::Component;
use crate::diagnostics::DiagnosticSink;
use crate::document::LineEnding;
use crate::logo::LogoSource;
use crate::metadata::FileMetadata;
use crate::metadata::HeaderMetadata;
use crate::prefix::CommentPrefixes;
use crate::prompt::Prompter;
use crate::prompt::TextField;
use crate::prompt::text_or_empty;

/// Render a decoration line (the opener or closer of a header), terminated
/// by `eol`.
///
/// This is the only place decoration text is produced. The builder writes
/// it and the locator compares against it, so the two always agree.
pub fn decoration_line(
	format: &HeaderFormat,
	prefix: &str,
	marker: &str,
	project_name: &str,
	eol: LineEnding,
) -> String {
	let mut line = format!(
		"{prefix}{}{marker} {project_name}{}",
		format.decoration_open, format.decoration_close
	);
	line.truncate(line.trim_end().len());
	line.push_str(eol.as_str());
	line
}

/// Remove one trailing line terminator from `line`.
pub fn strip_terminator(line: &str, eol: LineEnding) -> &str {
	line.strip_suffix(eol.as_str())
		.or_else(|| line.strip_suffix('\n'))
		.unwrap_or(line)
}

/// `DD-MM-YYYY` with the configured separator.
pub fn format_date(format: &HeaderFormat, instant: &NaiveDateTime) -> String {
	let sep = &format.date_separator;
	format!(
		"{:02}{sep}{:02}{sep}{:04}",
		instant.day(),
		instant.month(),
		instant.year()
	)
}

/// `HH:MM:SS DD-MM-YYYY` with the configured separators.
pub fn format_last_modified(format: &HeaderFormat, instant: &NaiveDateTime) -> String {
	let sep = &format.time_separator;
	format!(
		"{:02}{sep}{:02}{sep}{:02}{}{}",
		instant.hour(),
		instant.minute(),
		instant.second(),
		format.time_date_separator,
		format_date(format, instant)
	)
}

/// Renders header text.
pub struct HeaderBuilder<'a> {
	config: &'a HeaderConfig,
	format: &'a HeaderFormat,
	prompter: &'a dyn Prompter,
	logo: &'a dyn LogoSource,
	sink: &'a dyn DiagnosticSink,
	project_name: &'a str,
}

impl<'a> HeaderBuilder<'a> {
	pub fn new(ctx: &HeaderContext<'a>) -> Self {
		Self {
			config: ctx.config,
			format: &ctx.config.header,
			prompter: ctx.prompter,
			logo: ctx.logo,
			sink: ctx.sink,
			project_name: ctx.project_name,
		}
	}

	/// Gather the values for a new header: prompts for the description and
	/// purpose and picks the logo.
	pub fn collect_metadata(&self, file: FileMetadata, now: NaiveDateTime) -> HeaderMetadata {
		let description = text_or_empty(
			self.prompter,
			TextField::Description,
			&format!("Describe {}", file.file_name),
		);
		let purpose = text_or_empty(
			self.prompter,
			TextField::Purpose,
			&format!("What is the purpose of {}?", file.file_name),
		);

		HeaderMetadata {
			project_name: self.project_name.to_string(),
			file,
			created: now,
			modified: now,
			description,
			purpose,
			logo: self.logo.logo(),
		}
	}

	/// The full header, every line terminated by the file's line ending.
	pub fn render(
		&self,
		prefixes: &CommentPrefixes,
		metadata: &HeaderMetadata,
		language: Option<&str>,
	) -> String {
		let eol = metadata.file.line_ending;
		let mut text = String::new();
		for line in self.lines(prefixes, metadata, language) {
			text.push_str(&line);
			text.push_str(eol.as_str());
		}

		self.sink.debug(
			Component::HeaderBuilder,
			&format!("rendered header for `{}`", metadata.file.file_name),
		);
		text
	}

	/// The header lines without terminators.
	pub fn lines(
		&self,
		prefixes: &CommentPrefixes,
		metadata: &HeaderMetadata,
		language: Option<&str>,
	) -> Vec<String> {
		let format = self.format;
		let keys = &format.keys;
		let middle = prefixes.middle.as_str();
		let extra = language.and_then(|name| self.config.language(name));
		let mut lines = Vec::new();

		if let Some(extra) = extra {
			lines.extend(extra.prepend.iter().cloned());
		}
		if prefixes.opener != prefixes.middle {
			lines.push(trimmed(&prefixes.opener));
		}

		lines.push(self.decoration(middle, &format.begin_marker, &metadata.project_name));
		self.push_block(&mut lines, middle, &keys.logo, &metadata.logo);
		lines.push(self.field(middle, &keys.project, &metadata.project_name));
		lines.push(self.field(middle, &keys.file, &metadata.file.file_name));
		lines.push(self.field(
			middle,
			&keys.created,
			&format_date(format, &metadata.created),
		));
		lines.push(self.field(
			middle,
			&keys.last_modified,
			&format_last_modified(format, &metadata.modified),
		));

		let description: Vec<String> = metadata
			.description
			.lines()
			.map(ToString::to_string)
			.collect();
		self.push_block(&mut lines, middle, &keys.description, &description);
		lines.push(self.field(middle, &keys.copyright, &format.copyright));
		lines.push(self.field(middle, &keys.purpose, &metadata.purpose));
		lines.push(trimmed(&format!("{middle}{}", format.end_of_transmission)));
		lines.push(self.decoration(middle, &format.end_marker, &metadata.project_name));

		if prefixes.closer != prefixes.middle {
			lines.push(trimmed(&prefixes.closer));
		}
		if let Some(extra) = extra {
			lines.extend(extra.append.iter().cloned());
		}

		lines
	}

	/// A fresh last-modified line for `now`, without terminator.
	pub fn last_modified_line(&self, prefixes: &CommentPrefixes, now: &NaiveDateTime) -> String {
		self.field(
			&prefixes.middle,
			&self.format.keys.last_modified,
			&format_last_modified(self.format, now),
		)
	}

	/// The start of the last-modified line, used to find it in an existing
	/// header.
	pub fn last_modified_key(&self, prefixes: &CommentPrefixes) -> String {
		format!("{}{}", prefixes.middle, self.format.keys.last_modified)
	}

	fn decoration(&self, prefix: &str, marker: &str, project_name: &str) -> String {
		let line = decoration_line(self.format, prefix, marker, project_name, LineEnding::Lf);
		strip_terminator(&line, LineEnding::Lf).to_string()
	}

	fn field(&self, prefix: &str, key: &str, value: &str) -> String {
		trimmed(&format!("{prefix}{key}{}{value}", self.format.key_separator))
	}

	fn push_block(&self, lines: &mut Vec<String>, prefix: &str, key: &str, entries: &[String]) {
		lines.push(trimmed(&format!("{prefix}{key}{}", self.format.key_separator)));
		for entry in entries {
			lines.push(trimmed(&format!("{prefix}{entry}")));
		}
		lines.push(trimmed(&format!("{prefix}{}", self.format.block_terminator)));
		if self.format.blank_line_after_multiline {
			lines.push(trimmed(prefix));
		}
	}
}

fn trimmed(line: &str) -> String {
	line.trim_end().to_string()
}
