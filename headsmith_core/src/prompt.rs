use std::cell::RefCell;
use std::collections::VecDeque;

use crate::HeaderError;
use crate::HeaderResult;

/// Free-text fields requested while building a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
	Description,
	Purpose,
}

impl TextField {
	pub fn label(self) -> &'static str {
		match self {
			Self::Description => "description",
			Self::Purpose => "purpose",
		}
	}
}

/// Source of user input.
///
/// `None` from [`Prompter::text`] or [`Prompter::choose`] means the prompt
/// was cancelled. Cancellation is never an error: callers fall back to a
/// default value.
pub trait Prompter {
	/// Ask for free text.
	fn text(&self, field: TextField, message: &str) -> Option<String>;

	/// Ask for one of `options`, returning its index.
	fn choose(&self, message: &str, options: &[String]) -> Option<usize>;

	/// Ask a yes/no question. Cancellation is `false`.
	fn confirm(&self, message: &str) -> bool;
}

/// Cancels every prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
	fn text(&self, _field: TextField, _message: &str) -> Option<String> {
		None
	}

	fn choose(&self, _message: &str, _options: &[String]) -> Option<usize> {
		None
	}

	fn confirm(&self, _message: &str) -> bool {
		false
	}
}

/// Replays queued answers in order. An exhausted queue behaves like a
/// cancelled prompt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
	texts: RefCell<VecDeque<Option<String>>>,
	choices: RefCell<VecDeque<Option<usize>>>,
	confirmations: RefCell<VecDeque<bool>>,
	asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_text(self, answer: impl Into<String>) -> Self {
		self.texts.borrow_mut().push_back(Some(answer.into()));
		self
	}

	#[must_use]
	pub fn with_cancelled_text(self) -> Self {
		self.texts.borrow_mut().push_back(None);
		self
	}

	#[must_use]
	pub fn with_choice(self, choice: Option<usize>) -> Self {
		self.choices.borrow_mut().push_back(choice);
		self
	}

	#[must_use]
	pub fn with_confirmation(self, answer: bool) -> Self {
		self.confirmations.borrow_mut().push_back(answer);
		self
	}

	/// Every prompt message shown so far.
	pub fn asked(&self) -> Vec<String> {
		self.asked.borrow().clone()
	}
}

impl Prompter for ScriptedPrompter {
	fn text(&self, _field: TextField, message: &str) -> Option<String> {
		self.asked.borrow_mut().push(message.to_string());
		self.texts.borrow_mut().pop_front().flatten()
	}

	fn choose(&self, message: &str, options: &[String]) -> Option<usize> {
		self.asked.borrow_mut().push(message.to_string());
		self.choices
			.borrow_mut()
			.pop_front()
			.flatten()
			.filter(|index| *index < options.len())
	}

	fn confirm(&self, message: &str) -> bool {
		self.asked.borrow_mut().push(message.to_string());
		self.confirmations.borrow_mut().pop_front().unwrap_or(false)
	}
}

/// Ask for one of `options`, falling back to the first on cancellation.
pub fn choose_or_first(
	prompter: &dyn Prompter,
	message: &str,
	options: &[String],
) -> HeaderResult<String> {
	let Some(first) = options.first() else {
		return Err(HeaderError::EmptyChoice);
	};

	let chosen = prompter
		.choose(message, options)
		.and_then(|index| options.get(index))
		.unwrap_or(first);

	Ok(chosen.clone())
}

/// Ask for free text, falling back to an empty string on cancellation.
pub fn text_or_empty(prompter: &dyn Prompter, field: TextField, message: &str) -> String {
	prompter.text(field, message).unwrap_or_default()
}
