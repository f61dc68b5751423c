use crate::clock::Clock;
use crate::config::Exclusions;
use crate::config::HeaderConfig;
use crate::diagnostics::DiagnosticSink;
use crate::logo::LogoSource;
use crate::prompt::Prompter;
use crate::rules::RuleTable;

/// Everything the engine components need from the outside world, passed
/// explicitly to each constructor.
#[derive(Clone, Copy)]
pub struct HeaderContext<'a> {
	pub config: &'a HeaderConfig,
	pub rules: &'a RuleTable,
	pub exclusions: &'a Exclusions,
	pub sink: &'a dyn DiagnosticSink,
	pub prompter: &'a dyn Prompter,
	pub clock: &'a dyn Clock,
	pub logo: &'a dyn LogoSource,
	/// Project name written into decoration lines and the project field.
	pub project_name: &'a str,
}
