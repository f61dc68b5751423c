use std::fmt;

use serde::Serialize;

use crate::HeaderContext;
use crate::HeaderError;
use crate::HeaderResult;
use crate::builder::HeaderBuilder;
use crate::diagnostics::Component;
use crate::document::Document;
use crate::locator::HeaderBoundary;
use crate::locator::HeaderLocator;
use crate::locator::LocateOutcome;
use crate::metadata::FileMetadata;
use crate::prefix::CommentPrefixes;
use crate::prefix::CommentPrefixSelector;
use crate::rules::LanguageRuleResolver;
use crate::rules::ResolvedCommentStyle;

/// Which entry point triggered a lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Explicit request to add a header.
	Inject,
	/// Document save hook.
	Refresh,
}

/// Why a run finished without editing the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	RefreshDisabled,
	Excluded,
	CreationDisabled,
	CreationDeclined,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Self::RefreshDisabled => "refresh on save is disabled",
			Self::Excluded => "file matches an exclusion pattern",
			Self::CreationDisabled => "no header and creation on save is disabled",
			Self::CreationDeclined => "no header and creation was declined",
		};
		f.write_str(text)
	}
}

/// Result of one inject or refresh run. At most one edit was applied.
#[derive(Debug)]
pub enum LifecycleOutcome {
	/// A new header was inserted starting at `line`.
	Inserted { line: usize, lines: usize },
	/// The last-modified line at `line` was rewritten.
	Refreshed { line: usize },
	/// Nothing to do.
	Skipped(SkipReason),
	/// The run stopped before editing.
	Aborted(HeaderError),
}

impl LifecycleOutcome {
	/// True when the document was edited.
	pub fn is_edit(&self) -> bool {
		matches!(self, Self::Inserted { .. } | Self::Refreshed { .. })
	}

	pub fn is_aborted(&self) -> bool {
		matches!(self, Self::Aborted(_))
	}
}

/// Runs detect → inject / refresh as one operation.
pub struct HeaderLifecycle<'a> {
	ctx: HeaderContext<'a>,
}

impl<'a> HeaderLifecycle<'a> {
	pub fn new(ctx: &HeaderContext<'a>) -> Self {
		Self { ctx: *ctx }
	}

	/// Add a header, or refresh the timestamp of the existing one.
	pub fn inject(&self, document: &mut dyn Document) -> LifecycleOutcome {
		self.run(document, Operation::Inject)
	}

	/// Save hook: refresh the timestamp of an existing header, optionally
	/// offering to create one.
	pub fn refresh(&self, document: &mut dyn Document) -> LifecycleOutcome {
		self.run(document, Operation::Refresh)
	}

	pub fn run(&self, document: &mut dyn Document, operation: Operation) -> LifecycleOutcome {
		match self.try_run(document, operation) {
			Ok(outcome) => {
				if let LifecycleOutcome::Skipped(reason) = &outcome {
					self.ctx
						.sink
						.info(Component::Lifecycle, &format!("skipped: {reason}"));
				}
				outcome
			}
			Err(error) => {
				self.ctx
					.sink
					.error(Component::Lifecycle, &format!("aborted: {error}"));
				LifecycleOutcome::Aborted(error)
			}
		}
	}

	fn try_run(
		&self,
		document: &mut dyn Document,
		operation: Operation,
	) -> HeaderResult<LifecycleOutcome> {
		if operation == Operation::Refresh {
			if !self.ctx.config.refresh.on_save {
				return Ok(LifecycleOutcome::Skipped(SkipReason::RefreshDisabled));
			}
			if document
				.path()
				.is_some_and(|path| self.ctx.exclusions.is_excluded(path))
			{
				return Ok(LifecycleOutcome::Skipped(SkipReason::Excluded));
			}
		}

		let file = FileMetadata::from_document(document)?;
		if document.is_closed() {
			return Err(HeaderError::DocumentUnavailable);
		}

		let style = LanguageRuleResolver::new(&self.ctx)
			.resolve(&file.language_id, Some(&file.extension));
		let prefixes = CommentPrefixSelector::new(&self.ctx).select(&style)?;
		let outcome = HeaderLocator::new(&self.ctx).locate(&prefixes, document);

		match (outcome, operation) {
			(LocateOutcome::Aborted, _) => Err(HeaderError::DocumentUnavailable),
			(LocateOutcome::Complete(boundary), _) => {
				let line = self.update_timestamp(document, &prefixes, Some(boundary))?;
				Ok(LifecycleOutcome::Refreshed { line })
			}
			// A broken header gets the same treatment as a missing one: the
			// new header goes above whatever fragments are left.
			(LocateOutcome::Absent | LocateOutcome::Broken(_), Operation::Inject) => {
				Ok(self.insert_header(document, &prefixes, &style, file))
			}
			(LocateOutcome::Absent | LocateOutcome::Broken(_), Operation::Refresh) => {
				if !self.ctx.config.refresh.prompt_to_create {
					return Ok(LifecycleOutcome::Skipped(SkipReason::CreationDisabled));
				}

				let question = format!("{} has no header. Create one?", file.file_name);
				if self.ctx.prompter.confirm(&question) {
					Ok(self.insert_header(document, &prefixes, &style, file))
				} else {
					Ok(LifecycleOutcome::Skipped(SkipReason::CreationDeclined))
				}
			}
		}
	}

	/// Classify the document without editing it.
	pub fn detect(&self, document: &dyn Document) -> HeaderResult<LocateOutcome> {
		let file = FileMetadata::from_document(document)?;
		if document.is_closed() {
			return Err(HeaderError::DocumentUnavailable);
		}

		let style = LanguageRuleResolver::new(&self.ctx)
			.resolve(&file.language_id, Some(&file.extension));
		let prefixes = CommentPrefixSelector::new(&self.ctx).select(&style)?;
		Ok(HeaderLocator::new(&self.ctx).locate(&prefixes, document))
	}

	/// Rewrite the last-modified line inside `boundary`. Returns the index of
	/// the rewritten line.
	pub fn update_timestamp(
		&self,
		document: &mut dyn Document,
		prefixes: &CommentPrefixes,
		boundary: Option<HeaderBoundary>,
	) -> HeaderResult<usize> {
		let boundary = boundary.ok_or(HeaderError::BoundaryMissing)?;
		let builder = HeaderBuilder::new(&self.ctx);
		let key = builder.last_modified_key(prefixes);
		let eol = document.line_ending().unwrap_or_default();

		let found = (boundary.start..=boundary.end).find(|index| {
			document
				.line(*index)
				.is_some_and(|line| line.starts_with(&key))
		});
		let Some(index) = found else {
			return Err(HeaderError::KeyLineNotFound {
				key: self.ctx.config.header.keys.last_modified.clone(),
				start: boundary.start + 1,
				end: boundary.end + 1,
			});
		};

		let now = self.ctx.clock.now();
		let mut line = builder.last_modified_line(prefixes, &now);
		line.push_str(eol.as_str());
		document.replace(index..index + 1, &line);
		self.ctx.sink.info(
			Component::Lifecycle,
			&format!("refreshed last-modified timestamp on line {}", index + 1),
		);

		Ok(index)
	}

	fn insert_header(
		&self,
		document: &mut dyn Document,
		prefixes: &CommentPrefixes,
		style: &ResolvedCommentStyle,
		file: FileMetadata,
	) -> LifecycleOutcome {
		let eol = file.line_ending;
		let builder = HeaderBuilder::new(&self.ctx);
		let metadata = builder.collect_metadata(file, self.ctx.clock.now());
		let mut text = builder.render(prefixes, &metadata, style.language.as_deref());

		let mut line = 0;
		if document.line(0).is_some_and(|first| first.starts_with("#!")) {
			text.insert_str(0, eol.as_str());
			line = 1;
		}

		let lines = text.matches(eol.as_str()).count();
		document.insert(line, &text);
		self.ctx.sink.info(
			Component::Lifecycle,
			&format!(
				"inserted a {lines}-line header into `{}`",
				metadata.file.file_name
			),
		);

		LifecycleOutcome::Inserted { line, lines }
	}
}
