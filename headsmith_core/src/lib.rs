//! `headsmith_core` is the engine behind [headsmith](https://github.com/headsmith/headsmith). It writes a metadata header at the top of source files using the comment syntax of each file's language, finds headers that are already there, and keeps their last-modified timestamp current.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document (language id + extension)
//!   → LanguageRuleResolver (rule table + per-language overrides → comment tokens)
//!   → CommentPrefixSelector (tokens → opener / middle / closer prefixes)
//!   → HeaderLocator (scan window → complete / absent / broken / aborted)
//!   → HeaderLifecycle (insert a new header or rewrite the last-modified line)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loading `headsmith.toml` (header strings, scan window, overrides, exclusions and logo).
//! - [`rules`]: The comment rule table and language resolution.
//! - [`builder`]: Header rendering, including the decoration routine shared with the locator.
//! - [`locator`]: Header detection.
//! - [`lifecycle`]: The inject and refresh operations.
//! - [`files`]: Running the lifecycle on files from disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use headsmith_core::*;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = HeaderConfig::load_or_default(root).unwrap();
//! let sink = TracingSink;
//! let rules = RuleTable::for_config(&config, root, &sink);
//! let exclusions = config.exclusions(root).unwrap();
//! let logo = ConfiguredLogo::from_config(&config.logo, root).unwrap();
//! let project_name = config.project_name(root);
//!
//! let ctx = HeaderContext {
//! 	config: &config,
//! 	rules: &rules,
//! 	exclusions: &exclusions,
//! 	sink: &sink,
//! 	prompter: &NonInteractive,
//! 	clock: &SystemClock,
//! 	logo: &logo,
//! 	project_name: &project_name,
//! };
//!
//! let run = run_file(&ctx, Path::new("src/main.rs"), Operation::Inject, None).unwrap();
//! run.write().unwrap();
//! ```

pub use builder::*;
pub use clock::*;
pub use config::*;
pub use context::*;
pub use diagnostics::*;
pub use document::*;
pub use error::*;
pub use files::*;
pub use lifecycle::*;
pub use locator::*;
pub use logo::*;
pub use metadata::*;
pub use prefix::*;
pub use prompt::*;
pub use rules::*;

pub mod builder;
mod clock;
pub mod config;
mod context;
mod diagnostics;
mod document;
#[allow(unused_assignments)]
mod error;
pub mod files;
pub mod lifecycle;
pub mod locator;
mod logo;
mod metadata;
mod prefix;
mod prompt;
pub mod rules;

#[cfg(test)]
mod __fixtures;
