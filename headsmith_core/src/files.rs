use std::path::Path;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::HeaderContext;
use crate::HeaderResult;
use crate::document::PLAIN_TEXT;
use crate::document::TextDocument;
use crate::lifecycle::HeaderLifecycle;
use crate::lifecycle::LifecycleOutcome;
use crate::lifecycle::Operation;
use crate::locator::LocateOutcome;

/// The result of running the lifecycle on a file read from disk.
#[derive(Debug)]
pub struct FileRun {
	pub path: PathBuf,
	pub outcome: LifecycleOutcome,
	/// File content before the run.
	pub original: String,
	/// File content after the run.
	pub updated: String,
}

impl FileRun {
	pub fn changed(&self) -> bool {
		self.original != self.updated
	}

	/// Write the updated content back to disk when it changed.
	pub fn write(&self) -> HeaderResult<()> {
		if self.changed() {
			std::fs::write(&self.path, &self.updated)?;
		}
		Ok(())
	}
}

fn open_document(path: &Path, language_id: Option<&str>) -> HeaderResult<TextDocument> {
	let language_id = language_id.unwrap_or(PLAIN_TEXT);
	Ok(TextDocument::open(path)?.with_language_id(Some(language_id)))
}

/// Run `operation` on the file at `path` without writing the result.
///
/// Without an explicit `language_id` the comment style is resolved from the
/// file extension.
pub fn run_file(
	ctx: &HeaderContext<'_>,
	path: &Path,
	operation: Operation,
	language_id: Option<&str>,
) -> HeaderResult<FileRun> {
	let mut document = open_document(path, language_id)?;
	let original = document.text();
	let outcome = HeaderLifecycle::new(ctx).run(&mut document, operation);

	Ok(FileRun {
		path: path.to_path_buf(),
		outcome,
		original,
		updated: document.text(),
	})
}

/// Classify the file at `path` without editing it.
pub fn detect_file(
	ctx: &HeaderContext<'_>,
	path: &Path,
	language_id: Option<&str>,
) -> HeaderResult<LocateOutcome> {
	let document = open_document(path, language_id)?;
	HeaderLifecycle::new(ctx).detect(&document)
}

/// Expand `paths` into the files headers apply to.
///
/// Files named explicitly are kept whatever their extension. Directories are
/// walked with `.gitignore` support and only yield files whose extension has
/// a comment rule. Excluded files are dropped in both cases.
pub fn discover_files(
	ctx: &HeaderContext<'_>,
	root: &Path,
	paths: &[PathBuf],
) -> HeaderResult<Vec<PathBuf>> {
	let mut files = Vec::new();

	for path in paths {
		let path = if path.is_absolute() {
			path.clone()
		} else {
			root.join(path)
		};

		if path.is_file() {
			if !ctx.exclusions.is_excluded(&path) {
				files.push(path);
			}
			continue;
		}

		for entry in WalkBuilder::new(&path).hidden(true).build() {
			let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
			let candidate = entry.path();
			if !entry.file_type().is_some_and(|kind| kind.is_file()) {
				continue;
			}
			if ctx.exclusions.is_excluded(candidate) {
				continue;
			}
			let has_rule = candidate
				.extension()
				.and_then(|ext| ext.to_str())
				.is_some_and(|ext| ctx.rules.find(PLAIN_TEXT, Some(ext)).is_some());
			if has_rule {
				files.push(candidate.to_path_buf());
			}
		}
	}

	files.sort();
	files.dedup();
	Ok(files)
}
