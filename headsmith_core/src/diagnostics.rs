use std::cell::RefCell;
use std::fmt;

use serde::Serialize;

/// The engine component that emitted a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
	RuleResolver,
	PrefixSelector,
	HeaderBuilder,
	HeaderLocator,
	Lifecycle,
	Config,
}

impl Component {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RuleResolver => "rule_resolver",
			Self::PrefixSelector => "prefix_selector",
			Self::HeaderBuilder => "header_builder",
			Self::HeaderLocator => "header_locator",
			Self::Lifecycle => "lifecycle",
			Self::Config => "config",
		}
	}
}

impl fmt::Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
	Debug,
	Info,
	Warning,
	Error,
}

/// A message emitted by one of the engine components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub component: Component,
	pub level: Level,
	pub message: String,
}

impl Diagnostic {
	pub fn new(component: Component, level: Level, message: impl Into<String>) -> Self {
		Self {
			component,
			level,
			message: message.into(),
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.component, self.message)
	}
}

/// Receiver for engine diagnostics.
///
/// Every component reports through the sink it was constructed with, so
/// callers decide whether messages end up in a log, a terminal, or a test
/// buffer.
pub trait DiagnosticSink {
	fn emit(&self, diagnostic: Diagnostic);

	fn debug(&self, component: Component, message: &str) {
		self.emit(Diagnostic::new(component, Level::Debug, message));
	}

	fn info(&self, component: Component, message: &str) {
		self.emit(Diagnostic::new(component, Level::Info, message));
	}

	fn warning(&self, component: Component, message: &str) {
		self.emit(Diagnostic::new(component, Level::Warning, message));
	}

	fn error(&self, component: Component, message: &str) {
		self.emit(Diagnostic::new(component, Level::Error, message));
	}
}

/// Forwards diagnostics to `tracing` with the component as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn emit(&self, diagnostic: Diagnostic) {
		let component = diagnostic.component.as_str();
		let message = diagnostic.message.as_str();
		match diagnostic.level {
			Level::Debug => tracing::debug!(component, "{message}"),
			Level::Info => tracing::info!(component, "{message}"),
			Level::Warning => tracing::warn!(component, "{message}"),
			Level::Error => tracing::error!(component, "{message}"),
		}
	}
}

/// Keeps every diagnostic in memory so callers can inspect what a run
/// reported.
#[derive(Debug, Default)]
pub struct CollectingSink {
	entries: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Remove and return everything collected so far.
	pub fn take(&self) -> Vec<Diagnostic> {
		self.entries.take()
	}

	pub fn entries(&self) -> Vec<Diagnostic> {
		self.entries.borrow().clone()
	}

	/// Returns true if any collected message contains `needle`.
	pub fn contains(&self, needle: &str) -> bool {
		self.entries
			.borrow()
			.iter()
			.any(|entry| entry.message.contains(needle))
	}
}

impl DiagnosticSink for CollectingSink {
	fn emit(&self, diagnostic: Diagnostic) {
		self.entries.borrow_mut().push(diagnostic);
	}
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
	fn emit(&self, diagnostic: Diagnostic) {
		(**self).emit(diagnostic);
	}
}
