//! scriptree - edit script projects stored as JSON documents.
//!
//! Usage:
//!   scriptree init                 Create a project from the starter layout
//!   scriptree tree                 Print the project tree
//!   scriptree touch server/a.lua   Create an empty file
//!   scriptree mv a.lua server      Move a node into a folder
//!   scriptree export               Write <project>.zip
//!   scriptree --help               Show help

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use scriptree_core::{ArchiveCompression, EditorConfig, FolderEntries, FolderNode, NodePath, Tree};
use scriptree_editor::{EditorSession, SessionError};
use scriptree_ops::{
    ArchiveOptions, Outcome, UploadEntry, archive_file_name, collect_dir, export, read_archive,
    read_content, scaffold,
};
use scriptree_sync::{ExternalSync, JsonDirStore};

#[derive(Parser)]
#[command(
    name = "scriptree",
    version,
    about = "Virtual file tree for script projects",
    long_about = "scriptree edits the file tree of a script project stored as a JSON \
                  document, and exports it as a zip archive.\n\n\
                  Set SCRIPTREE_LOG (e.g. `debug`) to see what happens under the hood."
)]
struct Cli {
    /// Directory holding project documents
    #[arg(short, long, global = true, default_value = "projects")]
    store: PathBuf,

    /// Project id
    #[arg(short, long, global = true, default_value = "default")]
    project: String,

    /// Config file (defaults to <config dir>/scriptree/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new project
    Init {
        /// Name written into the manifest (defaults to the project id)
        #[arg(short, long)]
        name: Option<String>,

        /// Start with an empty tree instead of the starter layout
        #[arg(long)]
        empty: bool,
    },

    /// List stored projects
    List,

    /// Print the project tree
    Tree {
        /// Folder to print
        #[arg(default_value = "")]
        path: String,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Create an empty file
    Touch { path: String },

    /// Create an empty folder
    Mkdir { path: String },

    /// Delete a file or folder
    Rm { path: String },

    /// Move a node into a folder (a file target means its folder)
    Mv { source: String, target: String },

    /// Rename a node in place
    Rename { path: String, name: String },

    /// Replace a file's content (from TEXT, --file, or stdin)
    Write {
        path: String,

        text: Option<String>,

        /// Read content from a local file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Print a file's content
    Cat { path: String },

    /// Export the project as a zip archive
    Export {
        /// Output file (defaults to <name>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Project name used for the default file name
        #[arg(short, long)]
        name: Option<String>,

        /// Write an entry for every folder, not only empty ones
        #[arg(long)]
        all_folders: bool,

        /// Store entries without compression
        #[arg(long)]
        stored: bool,
    },

    /// Upload a local directory or zip archive into the project
    Import {
        /// Directory or .zip file
        source: PathBuf,

        /// Folder to import into
        #[arg(long, default_value = "")]
        parent: String,
    },

    /// Show project statistics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_or_default()?,
    };
    debug!(store = %cli.store.display(), project = %cli.project, "starting");

    let store = Arc::new(JsonDirStore::new(&cli.store));
    let project = cli.project.as_str();

    match cli.command {
        Command::Init { name, empty } => {
            run_init(&store, project, name.as_deref(), empty).await?;
        }
        Command::List => {
            for id in store.projects()? {
                println!("{id}");
            }
        }
        Command::Tree { path, depth } => {
            let tree = load_tree(&store, project).await?;
            run_tree(&tree, &NodePath::parse(&path), depth)?;
        }
        Command::Cat { path } => {
            let tree = load_tree(&store, project).await?;
            print!("{}", read_content(&tree, &NodePath::parse(&path))?);
        }
        Command::Stats { format } => {
            let tree = load_tree(&store, project).await?;
            run_stats(&tree, format)?;
        }
        Command::Export {
            output,
            name,
            all_folders,
            stored,
        } => {
            let tree = load_tree(&store, project).await?;
            let mut options = ArchiveOptions::from(&config);
            if all_folders {
                options.folder_entries = FolderEntries::All;
            }
            if stored {
                options.compression = ArchiveCompression::Stored;
            }
            let output = output.unwrap_or_else(|| {
                PathBuf::from(archive_file_name(name.as_deref().unwrap_or(project)))
            });
            run_export(tree, &output, options).await?;
        }
        Command::Touch { path } => {
            let (parent, name) = split(&path)?;
            mutate(store, project, config, |s| s.create_file(&parent, &name)).await?;
        }
        Command::Mkdir { path } => {
            let (parent, name) = split(&path)?;
            mutate(store, project, config, |s| s.create_folder(&parent, &name)).await?;
        }
        Command::Rm { path } => {
            mutate(store, project, config, |s| s.delete(&NodePath::parse(&path))).await?;
        }
        Command::Mv { source, target } => {
            let (source, target) = (NodePath::parse(&source), NodePath::parse(&target));
            mutate(store, project, config, |s| s.move_node(&source, &target)).await?;
        }
        Command::Rename { path, name } => {
            mutate(store, project, config, |s| s.rename(&NodePath::parse(&path), &name)).await?;
        }
        Command::Write { path, text, file } => {
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(file)) => std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let path = NodePath::parse(&path);
            mutate(store, project, config, |s| {
                s.select(&path)?;
                s.edit_buffer(content);
                s.save_buffer()
            })
            .await?;
        }
        Command::Import { source, parent } => {
            let entries = read_entries(&source)?;
            let parent = NodePath::parse(&parent);
            eprintln!("Importing {} entries from {}...", entries.len(), source.display());
            mutate(store, project, config, |s| s.ingest(&parent, &entries)).await?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SCRIPTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load a project that must already exist.
async fn load_tree(store: &JsonDirStore, project: &str) -> Result<Tree> {
    store
        .load(project)
        .await?
        .ok_or_else(|| eyre!("Project '{project}' not found in {}", store.dir().display()))
}

/// Open a session, apply one edit, and wait for it to be saved.
async fn mutate<F>(
    store: Arc<JsonDirStore>,
    project: &str,
    config: EditorConfig,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&mut EditorSession) -> Result<Outcome, SessionError>,
{
    if store.load(project).await?.is_none() {
        bail!("Project '{project}' not found; run `scriptree init` first");
    }

    let mut session = EditorSession::open(store, project, config)
        .await
        .context("Failed to open project")?;
    let outcome = edit(&mut session);

    let report = match &outcome {
        Ok(Outcome::Changed(_)) => session.next_report().await,
        _ => None,
    };
    session.close().await;

    if outcome?.is_noop() {
        eprintln!("Nothing to change");
    }
    if let Some(report) = report {
        report.result.context("Failed to save project")?;
    }
    Ok(())
}

fn split(path: &str) -> Result<(NodePath, String)> {
    let path = NodePath::parse(path);
    match (path.parent(), path.name()) {
        (Some(parent), Some(name)) => Ok((parent, name.to_string())),
        _ => bail!("A file or folder name is required"),
    }
}

async fn run_init(
    store: &JsonDirStore,
    project: &str,
    name: Option<&str>,
    empty: bool,
) -> Result<()> {
    if store.load(project).await?.is_some() {
        bail!("Project '{project}' already exists");
    }
    let tree = if empty {
        Tree::new()
    } else {
        scaffold(name.unwrap_or(project))
    };
    store.save(project, &tree).await.context("Failed to save project")?;
    eprintln!("Created {}", store.document_path(project)?.display());
    Ok(())
}

fn read_entries(source: &Path) -> Result<Vec<UploadEntry>> {
    if source.is_dir() {
        return collect_dir(source).with_context(|| format!("Failed to read {}", source.display()));
    }
    let bytes =
        std::fs::read(source).with_context(|| format!("Failed to read {}", source.display()))?;
    Ok(read_archive(&bytes)?)
}

async fn run_export(tree: Tree, output: &Path, options: ArchiveOptions) -> Result<()> {
    let bytes = tokio::task::spawn_blocking(move || export(&tree, &options)).await??;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("Exported {} to {}", format_size(bytes.len() as u64), output.display());
    Ok(())
}

/// Print the tree under `path`.
fn run_tree(tree: &Tree, path: &NodePath, max_depth: Option<u32>) -> Result<()> {
    let folder = scriptree_core::resolve_folder(tree, path)?;
    let label = if path.is_root() { "." } else { path.name().unwrap_or(".") };
    println!("{label}/");
    print_folder(folder, 0, max_depth.unwrap_or(u32::MAX));
    Ok(())
}

fn print_folder(folder: &FolderNode, depth: u32, max_depth: u32) {
    let indent = "  ".repeat(depth as usize + 1);
    for child in folder.sorted_children() {
        match child.as_folder() {
            Some(inner) => {
                println!("{indent}▼ {}/", child.name());
                if depth + 1 < max_depth {
                    print_folder(inner, depth + 1, max_depth);
                } else if !inner.is_empty() {
                    println!("{indent}    ... {} more", inner.child_count());
                }
            }
            None => {
                let size = child.as_file().map_or(0, |f| f.content.len() as u64);
                println!("{indent}  {:<40} {:>10}", truncate(child.name(), 40), format_size(size));
            }
        }
    }
}

fn run_stats(tree: &Tree, format: OutputFormat) -> Result<()> {
    let stats = tree.stats();
    match format {
        OutputFormat::Text => {
            println!("{}", "─".repeat(40));
            println!(" {} files, {} folders", stats.total_files, stats.total_folders);
            println!(" Total content: {}", format_size(stats.total_bytes));
            println!(" Max depth: {}", stats.max_depth);
            if let Some((path, size)) = &stats.largest_file {
                println!(" Largest file: {path} ({})", format_size(*size));
            }
            println!("{}", "─".repeat(40));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
