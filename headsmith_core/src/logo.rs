use std::path::Path;
use std::path::PathBuf;

use rand::seq::IndexedRandom;

use crate::HeaderError;
use crate::HeaderResult;
use crate::config::LogoConfig;

/// Supplies the logo lines embedded in a header.
pub trait LogoSource {
	/// The logo for the header being built.
	fn logo(&self) -> Vec<String>;

	/// Height of the tallest logo this source can return. Added to the scan
	/// window so a logo never pushes the closer out of reach.
	fn max_height(&self) -> usize;
}

/// Logo taken from `[logo]`: either the static lines or a random pick from
/// the `*.txt` files of a directory.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLogo {
	lines: Vec<String>,
	collection: Vec<Vec<String>>,
}

impl ConfiguredLogo {
	/// Static logo only.
	pub fn fixed(lines: Vec<String>) -> Self {
		Self {
			lines,
			collection: Vec::new(),
		}
	}

	/// Build from config. When random mode is enabled the directory is read
	/// eagerly; an empty directory falls back to the static lines.
	pub fn from_config(config: &LogoConfig, root: &Path) -> HeaderResult<Self> {
		let mut logo = Self::fixed(config.lines.clone());

		if config.random {
			if let Some(directory) = &config.directory {
				logo.collection = discover_logos(&root.join(directory))?;
			}
		}

		Ok(logo)
	}

	pub fn collection_len(&self) -> usize {
		self.collection.len()
	}
}

impl LogoSource for ConfiguredLogo {
	fn logo(&self) -> Vec<String> {
		let mut rng = rand::rng();
		self.collection
			.choose(&mut rng)
			.unwrap_or(&self.lines)
			.clone()
	}

	fn max_height(&self) -> usize {
		self.collection
			.iter()
			.map(Vec::len)
			.chain(std::iter::once(self.lines.len()))
			.max()
			.unwrap_or(0)
	}
}

/// Read every `*.txt` file in `directory` as a logo, sorted by file name.
pub fn discover_logos(directory: &Path) -> HeaderResult<Vec<Vec<String>>> {
	let to_error = |e: std::io::Error| {
		HeaderError::LogoDirectory {
			path: directory.display().to_string(),
			reason: e.to_string(),
		}
	};

	let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)
		.map_err(to_error)?
		.filter_map(Result::ok)
		.map(|entry| entry.path())
		.filter(|path| {
			path.is_file()
				&& path
					.extension()
					.is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
		})
		.collect();
	paths.sort();

	let mut logos = Vec::with_capacity(paths.len());
	for path in paths {
		let content = std::fs::read_to_string(&path).map_err(to_error)?;
		let lines: Vec<String> = content.lines().map(|line| line.trim_end().to_string()).collect();
		if !lines.is_empty() {
			logos.push(lines);
		}
	}

	tracing::debug!(count = logos.len(), path = %directory.display(), "discovered logos");
	Ok(logos)
}
