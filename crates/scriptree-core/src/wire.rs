//! Document encoding of a tree.
//!
//! A tree is stored as a nested object keyed by name; each value is tagged
//! with `type` and carries either `content` or `children`:
//!
//! ```json
//! { "server": { "type": "folder", "children": {
//!     "main.lua": { "type": "file", "content": "print('hi')" } } } }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TreeError;
use crate::name::{MAX_NAME_LEN, validate_name};
use crate::node::{Children, FileNode, FolderNode, Node};
use crate::path::NodePath;
use crate::tree::Tree;

struct ChildrenRef<'a>(&'a Children);

impl Serialize for ChildrenRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, node)| (name.as_str(), NodeRefWire(node))))
    }
}

struct NodeRefWire<'a>(&'a Node);

impl Serialize for NodeRefWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 2)?;
        match self.0 {
            Node::File(file) => {
                state.serialize_field("type", "file")?;
                state.serialize_field("content", &file.content)?;
            }
            Node::Folder(folder) => {
                state.serialize_field("type", "folder")?;
                state.serialize_field("children", &ChildrenRef(&folder.children))?;
            }
        }
        state.end()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChildrenRef(&self.root().children).serialize(serializer)
    }
}

/// Owned wire form. Missing or null `content`/`children` read as empty.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireNode {
    File {
        #[serde(default)]
        content: Option<String>,
    },
    Folder {
        #[serde(default)]
        children: Option<WireChildren>,
    },
}

/// Children as they appear in the document, repeated keys included.
#[derive(Default)]
struct WireChildren(Vec<(String, WireNode)>);

impl<'de> Deserialize<'de> for WireChildren {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WireChildrenVisitor)
    }
}

struct WireChildrenVisitor;

impl<'de> Visitor<'de> for WireChildrenVisitor {
    type Value = WireChildren;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of node names to nodes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, WireNode>()? {
            entries.push(entry);
        }
        Ok(WireChildren(entries))
    }
}

fn build_children(parent: &NodePath, wire: WireChildren) -> Result<Children, TreeError> {
    let mut children = Children::new();
    for (name, node) in wire.0 {
        validate_name(&name, MAX_NAME_LEN)?;
        if children.contains_key(name.as_str()) {
            return Err(TreeError::name_conflict(parent, name));
        }
        let node = match node {
            WireNode::File { content } => {
                Node::File(FileNode::with_content(name.as_str(), content.unwrap_or_default()))
            }
            WireNode::Folder { children } => Node::Folder(FolderNode {
                name: name.as_str().into(),
                children: build_children(&parent.join(&name), children.unwrap_or_default())?,
            }),
        };
        children.insert(name.into(), Arc::new(node));
    }
    Ok(children)
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Option::<WireChildren>::deserialize(deserializer)?;
        let children =
            build_children(&NodePath::root(), wire.unwrap_or_default()).map_err(D::Error::custom)?;
        Ok(Tree::from_root(FolderNode {
            name: Default::default(),
            children,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_document_shape() {
        let mut server = FolderNode::new("server");
        server.insert(FileNode::with_content("main.lua", "print('hi')"));
        let mut root = FolderNode::default();
        root.insert(server);
        let tree = Tree::from_root(root);

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "server": {
                    "type": "folder",
                    "children": {
                        "main.lua": { "type": "file", "content": "print('hi')" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_deserialize_tolerates_missing_fields() {
        let json = r#"{
            "a.lua": { "type": "file" },
            "empty": { "type": "folder" },
            "nulls": { "type": "folder", "children": null }
        }"#;
        let tree: Tree = serde_json::from_str(json).unwrap();

        let file = tree.resolve(&NodePath::parse("a.lua")).unwrap();
        assert_eq!(file.as_file().unwrap().content, "");
        assert!(tree.resolve(&NodePath::parse("empty")).unwrap().is_folder());
        assert!(tree.resolve(&NodePath::parse("nulls")).unwrap().is_folder());
    }

    #[test]
    fn test_deserialize_null_is_empty_tree() {
        let tree: Tree = serde_json::from_str("null").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_bad_names() {
        let json = r#"{ "a/b": { "type": "file", "content": "" } }"#;
        assert!(serde_json::from_str::<Tree>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_repeated_siblings() {
        let json = r#"{
            "a.lua": { "type": "file", "content": "one" },
            "a.lua": { "type": "file", "content": "two" }
        }"#;
        let err = serde_json::from_str::<Tree>(json).unwrap_err();
        assert!(err.to_string().contains("'a.lua' already exists in ''"));

        let nested = r#"{ "server": { "type": "folder", "children": {
            "main.lua": { "type": "file" },
            "main.lua": { "type": "folder" }
        } } }"#;
        let err = serde_json::from_str::<Tree>(nested).unwrap_err();
        assert!(err.to_string().contains("already exists in 'server'"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let json = r#"{ "x": { "type": "symlink" } }"#;
        assert!(serde_json::from_str::<Tree>(json).is_err());
    }
}
