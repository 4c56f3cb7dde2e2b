//! Zip export of a tree snapshot, and the reverse for re-import.

use std::io::{Cursor, Read, Seek, Write};

use scriptree_core::{ArchiveCompression, EditorConfig, FolderEntries, NodePath, NodeRef, Tree};
use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::upload::UploadEntry;

/// Errors raised while writing or reading an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive entry '{name}' is not valid UTF-8")]
    NotUtf8 { name: String },

    #[error("Archive entry '{name}' has no usable path")]
    InvalidEntry { name: String },
}

/// Options controlling archive layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub folder_entries: FolderEntries,
    pub compression: ArchiveCompression,
}

impl From<&EditorConfig> for ArchiveOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            folder_entries: config.folder_entries,
            compression: config.compression,
        }
    }
}

impl ArchiveOptions {
    fn file_options(&self) -> SimpleFileOptions {
        let method = match self.compression {
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
            ArchiveCompression::Stored => CompressionMethod::Stored,
        };
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(zip::DateTime::default())
    }
}

/// Download name for a project archive.
pub fn archive_file_name(project_name: &str) -> String {
    let name = project_name.trim().replace('/', "_");
    if name.is_empty() {
        "project.zip".to_string()
    } else {
        format!("{name}.zip")
    }
}

/// Serialize a snapshot into zip bytes.
pub fn export(tree: &Tree, options: &ArchiveOptions) -> Result<Vec<u8>, ArchiveError> {
    let cursor = export_to(tree, Cursor::new(Vec::new()), options)?;
    Ok(cursor.into_inner())
}

/// Serialize a snapshot into any seekable writer and hand the writer back.
///
/// Entries follow the tree's display order. Files become entries named by
/// their path; folders get a trailing-slash entry when they are empty, or
/// always under [`FolderEntries::All`]. Timestamps are fixed, so the same
/// snapshot always produces the same bytes.
pub fn export_to<W: Write + Seek>(
    tree: &Tree,
    writer: W,
    options: &ArchiveOptions,
) -> Result<W, ArchiveError> {
    let file_options = options.file_options();
    let mut zip = ZipWriter::new(writer);
    let mut files = 0usize;
    let mut folders = 0usize;

    for (path, node) in tree.walk() {
        match node {
            NodeRef::File(file) => {
                zip.start_file(path.to_string(), file_options)?;
                zip.write_all(file.content.as_bytes())?;
                files += 1;
            }
            NodeRef::Folder(folder) => {
                let explicit = match options.folder_entries {
                    FolderEntries::All => true,
                    FolderEntries::EmptyOnly => folder.is_empty(),
                };
                if explicit {
                    zip.add_directory(format!("{path}/"), file_options)?;
                    folders += 1;
                }
            }
        }
    }

    let writer = zip.finish()?;
    info!(files, folders, "archive written");
    Ok(writer)
}

/// Read zip bytes back into upload entries.
///
/// Directory entries become folders. Leading slashes and empty segments are
/// dropped; names are validated later, on ingest.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<UploadEntry>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let path = NodePath::parse(&name);
        if path.is_root() {
            return Err(ArchiveError::InvalidEntry { name });
        }

        if entry.is_dir() {
            entries.push(UploadEntry::Folder { path });
            continue;
        }

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        let content = String::from_utf8(bytes).map_err(|_| ArchiveError::NotUtf8 { name })?;
        entries.push(UploadEntry::File { path, content });
    }

    debug!(entries = entries.len(), "archive read");
    Ok(entries)
}
