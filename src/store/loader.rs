//! Reading collection files from a wildcard directory
//!
//! Three formats are recognized:
//! - `.txt`: one alternative per line; blank lines and `#` comments are skipped.
//!   The collection is named after the file path relative to the root.
//! - `.yaml` / `.yml` / `.json`: a mapping whose leaves are lists. Nested keys are
//!   joined with `/` and prefixed with the file's directory relative to the root.
//!   A top-level list is treated like a text file. List items are strings, numbers,
//!   booleans, or `{ text, weight }` records.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::Diagnostic;

use super::collection::{Alternative, Collection, Collections};

/// File extensions the store watches and loads
pub const EXTENSIONS: &[&str] = &["txt", "yaml", "yml", "json"];

/// Whether a path has one of the recognized extensions
pub fn is_collection_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Recognized files under `root`, in a stable name-sorted order
pub fn collection_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping unreadable wildcard path: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_collection_file(entry.path()))
        .map(|entry| entry.into_path())
}

/// Load every collection file under `root` into `collections`
///
/// Files that fail to read or parse are skipped and reported in `diagnostics`.
pub fn load_root(root: &Path, collections: &mut Collections, diagnostics: &mut Vec<Diagnostic>) {
    for path in collection_files(root) {
        match load_file(root, &path) {
            Ok(loaded) => {
                for collection in loaded {
                    collections.insert(collection);
                }
            }
            Err(message) => {
                let diag = Diagnostic::MalformedCollectionFile { path, message };
                log::warn!("{}", diag);
                diagnostics.push(diag);
            }
        }
    }
}

/// Parse one file into the collections it defines
pub fn load_file(root: &Path, path: &Path) -> Result<Vec<Collection>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let relative = path.strip_prefix(root).unwrap_or(path);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => Ok(vec![parse_text(&file_name(relative), &content)]),
        "json" => {
            let node: Node = serde_json::from_str(&content).map_err(|e| e.to_string())?;
            Ok(structured_collections(relative, node))
        }
        "yaml" | "yml" => {
            let node: Node = serde_yaml::from_str(&content).map_err(|e| e.to_string())?;
            Ok(structured_collections(relative, node))
        }
        other => Err(format!("unsupported extension '{}'", other)),
    }
}

/// Parse newline-delimited alternatives
pub fn parse_text(name: &str, content: &str) -> Collection {
    let texts = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));
    Collection::from_texts(name, texts)
}

/// Structured file content: nested mappings ending in lists
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Node {
    List(Vec<Entry>),
    Map(BTreeMap<String, Node>),
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Entry {
    Text(String),
    Number(f64),
    Flag(bool),
    Weighted {
        text: String,
        #[serde(default)]
        weight: Option<f64>,
    },
}

impl From<Entry> for Alternative {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Text(text) => Alternative::new(text),
            Entry::Number(n) => Alternative::new(n.to_string()),
            Entry::Flag(b) => Alternative::new(b.to_string()),
            Entry::Weighted { text, weight } => Alternative { text, weight },
        }
    }
}

fn structured_collections(relative: &Path, node: Node) -> Vec<Collection> {
    let mut out = Vec::new();
    match node {
        Node::List(entries) => {
            out.push(Collection::new(
                file_name(relative),
                entries.into_iter().map(Alternative::from).collect(),
            ));
        }
        Node::Map(map) => {
            let prefix = relative.parent().map(path_name).unwrap_or_default();
            flatten(&prefix, map, &mut out);
        }
    }
    out
}

fn flatten(prefix: &str, map: BTreeMap<String, Node>, out: &mut Vec<Collection>) {
    for (key, node) in map {
        let name = if prefix.is_empty() {
            key
        } else {
            format!("{}/{}", prefix, key)
        };
        match node {
            Node::List(entries) => out.push(Collection::new(
                name,
                entries.into_iter().map(Alternative::from).collect(),
            )),
            Node::Map(inner) => flatten(&name, inner, out),
        }
    }
}

/// Collection name for a file: relative path, `/`-separated, extension stripped
pub fn file_name(relative: &Path) -> String {
    path_name(&relative.with_extension(""))
}

fn path_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
