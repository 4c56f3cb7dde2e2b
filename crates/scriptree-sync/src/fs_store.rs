//! A directory of JSON documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scriptree_core::Tree;
use tracing::debug;

use crate::document::ProjectDocument;
use crate::error::SyncError;
use crate::sync::{BoxFuture, ExternalSync};

const EXTENSION: &str = "json";

/// Stores each project as `<dir>/<project_id>.json`.
///
/// Saves write a sibling temp file and rename it over the document, so a
/// reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's document.
    pub fn document_path(&self, project_id: &str) -> Result<PathBuf, SyncError> {
        check_project_id(project_id)?;
        Ok(self.dir.join(format!("{project_id}.{EXTENSION}")))
    }

    /// Ids of every stored project, sorted.
    pub fn projects(&self) -> Result<Vec<String>, SyncError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SyncError::io(&self.dir, err)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| SyncError::io(&self.dir, err))?.path();
            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn check_project_id(project_id: &str) -> Result<(), SyncError> {
    let bad = project_id.is_empty()
        || project_id == "."
        || project_id == ".."
        || project_id.contains(['/', '\\', '\0']);
    if bad {
        return Err(SyncError::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

impl ExternalSync for JsonDirStore {
    fn name(&self) -> &'static str {
        "json-dir"
    }

    fn load<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, Result<Option<Tree>, SyncError>> {
        Box::pin(async move {
            let path = self.document_path(project_id)?;
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(SyncError::io(path, err)),
            };
            let doc = ProjectDocument::from_json(&text)?;
            debug!(path = %path.display(), "project loaded");
            Ok(Some(doc.file_structure))
        })
    }

    fn save<'a>(
        &'a self,
        project_id: &'a str,
        tree: &'a Tree,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move {
            let path = self.document_path(project_id)?;
            let text = ProjectDocument::new(tree.clone()).to_json()?;

            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|err| SyncError::io(&self.dir, err))?;
            let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
            tokio::fs::write(&tmp, text)
                .await
                .map_err(|err| SyncError::io(&tmp, err))?;
            tokio::fs::rename(&tmp, &path)
                .await
                .map_err(|err| SyncError::io(&path, err))?;

            debug!(path = %path.display(), "project saved");
            Ok(())
        })
    }
}
