use serde::Serialize;

use crate::HeaderContext;
use crate::HeaderResult;
use crate::diagnostics::Component;
use crate::diagnostics::DiagnosticSink;
use crate::prompt::Prompter;
use crate::prompt::choose_or_first;
use crate::rules::ResolvedCommentStyle;

/// The literal prefixes written before header lines. Each one already ends
/// with the spacing token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentPrefixes {
	pub opener: String,
	pub middle: String,
	pub closer: String,
}

impl CommentPrefixes {
	pub fn new(
		opener: impl Into<String>,
		middle: impl Into<String>,
		closer: impl Into<String>,
	) -> Self {
		Self {
			opener: opener.into(),
			middle: middle.into(),
			closer: closer.into(),
		}
	}

	/// True when the header is wrapped in a block comment and needs
	/// standalone delimiter lines.
	pub fn is_block(&self) -> bool {
		self.opener != self.middle || self.closer != self.middle
	}
}

/// Chooses between single-line and multi-line comment forms.
pub struct CommentPrefixSelector<'a> {
	prefer_single_line: bool,
	spacing: &'a str,
	prompter: &'a dyn Prompter,
	sink: &'a dyn DiagnosticSink,
}

impl<'a> CommentPrefixSelector<'a> {
	pub fn new(ctx: &HeaderContext<'a>) -> Self {
		Self {
			prefer_single_line: ctx.config.comments.prefer_single_line,
			spacing: ctx.config.header.spacing.as_str(),
			prompter: ctx.prompter,
			sink: ctx.sink,
		}
	}

	pub fn select(&self, style: &ResolvedCommentStyle) -> HeaderResult<CommentPrefixes> {
		let multi = &style.multi_line;
		let (opener, middle, closer) = if multi.len() >= 2 && !self.prefer_single_line {
			if multi.len() >= 3 {
				(multi[0].clone(), multi[1].clone(), multi[2].clone())
			} else {
				(multi[0].clone(), String::new(), multi[1].clone())
			}
		} else if !style.single_line.is_empty() {
			let token = if style.prompt_comment_opening_type && style.single_line.len() > 1 {
				let message = format!(
					"Which comment token should be used for {} files?",
					style.language_name()
				);
				choose_or_first(self.prompter, &message, &style.single_line)?
			} else {
				style.single_line[0].clone()
			};
			(token.clone(), token.clone(), token)
		} else {
			(String::new(), String::new(), String::new())
		};

		let prefixes = CommentPrefixes {
			opener: format!("{opener}{}", self.spacing),
			middle: format!("{middle}{}", self.spacing),
			closer: format!("{closer}{}", self.spacing),
		};
		self.sink.debug(
			Component::PrefixSelector,
			&format!(
				"prefixes for `{}`: {:?} {:?} {:?}",
				style.language_name(),
				prefixes.opener,
				prefixes.middle,
				prefixes.closer
			),
		);

		Ok(prefixes)
	}
}
