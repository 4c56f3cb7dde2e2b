//! Starter layout for a new project.

use scriptree_core::{FileNode, FolderNode, Tree};

/// Build the starter tree: a manifest, a config script and one script each
/// under `client/` and `server/`.
pub fn scaffold(project_name: &str) -> Tree {
    let mut client = FolderNode::new("client");
    client.insert(FileNode::with_content("client.lua", "-- Client-side code here\n"));

    let mut server = FolderNode::new("server");
    server.insert(FileNode::with_content("server.lua", "-- Server-side code here\n"));

    let mut root = FolderNode::default();
    root.insert(FileNode::with_content("fxmanifest.lua", manifest(project_name)));
    root.insert(FileNode::with_content("config.lua", "-- Configuration settings\n"));
    root.insert(client);
    root.insert(server);
    Tree::from_root(root)
}

fn manifest(project_name: &str) -> String {
    format!(
        "fx_version 'cerulean'
game 'gta5'
description '{project_name}'
version '1.0.0'

shared_script 'config.lua'

client_scripts {{
    'client/*.lua'
}}

server_scripts {{
    'server/*.lua'
}}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptree_core::NodePath;

    #[test]
    fn test_scaffold_layout() {
        let tree = scaffold("demo");
        let paths: Vec<String> = tree.walk().map(|(path, _)| path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "client",
                "client/client.lua",
                "server",
                "server/server.lua",
                "config.lua",
                "fxmanifest.lua"
            ]
        );

        let manifest = tree.resolve(&NodePath::parse("fxmanifest.lua")).unwrap();
        assert!(manifest.as_file().unwrap().content.contains("description 'demo'"));
    }
}
