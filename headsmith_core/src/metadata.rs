use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::HeaderError;
use crate::HeaderResult;
use crate::document::Document;
use crate::document::LineEnding;

/// Identity of the file a header is written for. Every field is required;
/// a document missing any of them is treated as corrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
	pub path: PathBuf,
	pub file_name: String,
	/// Lowercase extension without the leading dot.
	pub extension: String,
	pub language_id: String,
	pub line_ending: LineEnding,
	pub version: u32,
}

impl FileMetadata {
	pub fn from_document(document: &dyn Document) -> HeaderResult<Self> {
		let path = document
			.path()
			.ok_or(HeaderError::MetadataCorruption { field: "path" })?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.filter(|name| !name.is_empty())
			.ok_or(HeaderError::MetadataCorruption { field: "file name" })?;
		let extension = path
			.extension()
			.map(|ext| ext.to_string_lossy().to_ascii_lowercase())
			.filter(|ext| !ext.is_empty())
			.ok_or(HeaderError::MetadataCorruption { field: "extension" })?;
		let language_id = document
			.language_id()
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.ok_or(HeaderError::MetadataCorruption {
				field: "language id",
			})?
			.to_string();
		let line_ending = document
			.line_ending()
			.ok_or(HeaderError::MetadataCorruption { field: "eol" })?;
		let version = document
			.version()
			.ok_or(HeaderError::MetadataCorruption { field: "version" })?;

		Ok(Self {
			path: path.to_path_buf(),
			file_name,
			extension,
			language_id,
			line_ending,
			version,
		})
	}
}

/// Everything rendered into a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMetadata {
	pub project_name: String,
	pub file: FileMetadata,
	pub created: NaiveDateTime,
	pub modified: NaiveDateTime,
	pub description: String,
	pub purpose: String,
	pub logo: Vec<String>,
}
