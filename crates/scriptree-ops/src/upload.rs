//! Ingestion of uploaded files and folders.

use std::io;
use std::path::Path;
use std::sync::Arc;

use compact_str::CompactString;
use scriptree_core::{
    EditorConfig, FileNode, FolderNode, Node, NodePath, Tree, TreeError, resolve_folder,
    validate_name,
};
use tracing::{debug, warn};

use crate::operation::Outcome;

/// One uploaded item, addressed relative to the folder it is dropped into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEntry {
    File { path: NodePath, content: String },
    Folder { path: NodePath },
}

impl UploadEntry {
    pub fn file(path: impl Into<NodePath>, content: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn folder(path: impl Into<NodePath>) -> Self {
        Self::Folder { path: path.into() }
    }

    /// Relative path of the entry.
    pub fn path(&self) -> &NodePath {
        match self {
            Self::File { path, .. } | Self::Folder { path } => path,
        }
    }
}

/// Ingest `entries` under `parent` with the default limits.
pub fn ingest(
    tree: &Tree,
    parent: &NodePath,
    entries: &[UploadEntry],
) -> Result<Outcome, TreeError> {
    ingest_with(tree, parent, entries, &EditorConfig::default())
}

/// Ingest `entries` under the folder at `parent`.
///
/// Intermediate folders are created as needed and shared between entries.
/// A top-level name that already exists under `parent` fails with
/// `NameConflict`. Ingestion is all-or-nothing: on any error the tree is
/// unchanged.
pub fn ingest_with(
    tree: &Tree,
    parent: &NodePath,
    entries: &[UploadEntry],
    config: &EditorConfig,
) -> Result<Outcome, TreeError> {
    let existing = resolve_folder(tree, parent)?;
    let mut staging = FolderNode::default();

    for entry in entries {
        let path = entry.path();
        let full = parent.join_path(path);
        let Some(top) = path.segments().first() else {
            return Err(TreeError::invalid_path(full));
        };
        for segment in path.segments() {
            validate_name(segment, config.max_name_len)?;
        }
        if config.max_depth.is_some_and(|max| full.depth() > max as usize) {
            return Err(TreeError::invalid_path(full));
        }
        if existing.contains(top) {
            return Err(TreeError::name_conflict(parent, top.clone()));
        }

        let leaf = match entry {
            UploadEntry::File { content, .. } => Node::File(FileNode::with_content(
                path.name().unwrap_or_default(),
                content.as_str(),
            )),
            UploadEntry::Folder { .. } => Node::folder(path.name().unwrap_or_default()),
        };
        place(&mut staging, parent, path.segments(), leaf)?;
    }

    if staging.is_empty() {
        return Ok(Outcome::NoOp);
    }

    debug!(parent = %parent, entries = entries.len(), "ingesting upload");
    let next = tree.update_folder(parent, |folder| {
        folder.children.extend(staging.children);
        Ok(())
    })?;
    Ok(Outcome::Changed(next))
}

fn place(
    folder: &mut FolderNode,
    base: &NodePath,
    segments: &[CompactString],
    leaf: Node,
) -> Result<(), TreeError> {
    let Some((name, rest)) = segments.split_first() else {
        return Err(TreeError::invalid_path(base));
    };

    if rest.is_empty() {
        return match folder.child(name) {
            None => {
                folder.insert(leaf);
                Ok(())
            }
            Some(current) if current.is_folder() && leaf.is_folder() => Ok(()),
            Some(_) => Err(TreeError::name_conflict(base, name.clone())),
        };
    }

    let child = folder
        .children
        .entry(name.clone())
        .or_insert_with(|| Arc::new(Node::folder(name.clone())));
    match Arc::make_mut(child) {
        Node::Folder(inner) => place(inner, &base.join(name), rest, leaf),
        Node::File(_) => Err(TreeError::invalid_path(base.join(name))),
    }
}

/// Walk a directory on disk into upload entries, relative to `root`.
///
/// Entries come out sorted by name, every folder before its contents.
/// Non-UTF-8 file content is converted lossily. Symlinks are skipped.
pub fn collect_dir(root: &Path) -> io::Result<Vec<UploadEntry>> {
    let mut entries = Vec::new();
    collect_into(root, &NodePath::root(), &mut entries)?;
    Ok(entries)
}

fn collect_into(dir: &Path, rel: &NodePath, out: &mut Vec<UploadEntry>) -> io::Result<()> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let file_type = child.file_type()?;
        let name = child.file_name();
        let path = rel.join(&name.to_string_lossy());

        if file_type.is_dir() {
            out.push(UploadEntry::folder(path.clone()));
            collect_into(&child.path(), &path, out)?;
        } else if file_type.is_file() {
            let bytes = std::fs::read(child.path())?;
            let content = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => {
                    warn!(
                        path = %child.path().display(),
                        "file is not valid UTF-8, converting lossily"
                    );
                    String::from_utf8_lossy(err.as_bytes()).into_owned()
                }
            };
            out.push(UploadEntry::File { path, content });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_content;

    #[test]
    fn test_ingest_creates_intermediate_folders() {
        let tree = Tree::new();
        let entries = vec![
            UploadEntry::file("pack/client/c.lua", "c"),
            UploadEntry::file("pack/server/s.lua", "s"),
            UploadEntry::folder("pack/empty"),
        ];
        let tree = ingest(&tree, &NodePath::root(), &entries).unwrap().into_tree(&tree);

        assert_eq!(read_content(&tree, &NodePath::parse("pack/client/c.lua")).unwrap(), "c");
        assert_eq!(read_content(&tree, &NodePath::parse("pack/server/s.lua")).unwrap(), "s");
        assert!(tree.resolve(&NodePath::parse("pack/empty")).unwrap().is_folder());
    }

    #[test]
    fn test_ingest_top_level_collision_is_atomic() {
        let tree = Tree::new();
        let tree = crate::create_folder(&tree, &NodePath::root(), "lib")
            .unwrap()
            .into_tree(&tree);

        let entries = vec![UploadEntry::file("fresh.lua", ""), UploadEntry::file("lib/x.lua", "")];
        let err = ingest(&tree, &NodePath::root(), &entries).unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
        assert!(tree.resolve(&NodePath::parse("fresh.lua")).is_err());
    }

    #[test]
    fn test_ingest_file_through_file_is_invalid() {
        let entries = vec![UploadEntry::file("a.lua", ""), UploadEntry::file("a.lua/b.lua", "")];
        let err = ingest(&Tree::new(), &NodePath::root(), &entries).unwrap_err();
        assert!(matches!(err, TreeError::InvalidPath { .. }));
    }

    #[test]
    fn test_ingest_respects_max_depth() {
        let config = EditorConfig::builder().max_depth(Some(2u32)).build().unwrap();
        let entries = vec![UploadEntry::file("a/b/c.lua", "")];
        let err = ingest_with(&Tree::new(), &NodePath::root(), &entries, &config).unwrap_err();
        assert!(matches!(err, TreeError::InvalidPath { .. }));
    }

    #[test]
    fn test_ingest_nothing_is_noop() {
        assert!(ingest(&Tree::new(), &NodePath::root(), &[]).unwrap().is_noop());
    }

    #[test]
    fn test_collect_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("server/lib")).unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("server/main.lua"), "print(1)").unwrap();
        std::fs::write(dir.path().join("fxmanifest.lua"), "fx").unwrap();

        let entries = collect_dir(dir.path()).unwrap();
        let paths: Vec<String> = entries.iter().map(|e| e.path().to_string()).collect();
        assert_eq!(
            paths,
            vec!["empty", "fxmanifest.lua", "server", "server/lib", "server/main.lua"]
        );

        let tree = ingest(&Tree::new(), &NodePath::root(), &entries)
            .unwrap()
            .into_tree(&Tree::new());
        assert_eq!(read_content(&tree, &NodePath::parse("server/main.lua")).unwrap(), "print(1)");
        assert!(tree.resolve(&NodePath::parse("server/lib")).unwrap().is_folder());
    }
}
