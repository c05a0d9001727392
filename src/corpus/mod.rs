//! Markdown corpus discovery and per-document provenance.
//!
//! The corpus is a directory tree of markdown chapters. Provenance is
//! positional: the second path segment (relative to the corpus root's parent)
//! names the module, the third the chapter file. Shallower paths fall back to
//! an "unknown" sentinel.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("docs directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fallback chapter title when a document has no top-level heading.
pub const UNTITLED: &str = "Untitled";

/// Sentinel for provenance segments missing from a shallow path.
pub const UNKNOWN: &str = "unknown";

/// A markdown source file with its extracted provenance.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the corpus root's parent, forward slashes.
    pub relative_path: String,
    /// Human-formatted module name ("module-1" becomes "Module 1").
    pub module: String,
    /// First top-level heading, or "Untitled".
    pub chapter_title: String,
    /// Chapter file name ("chapter-1.md").
    pub file_name: String,
    /// Raw markdown content.
    pub content: String,
}

/// Discover all markdown documents under `docs_dir`, sorted by path for a
/// deterministic enumeration order.
pub fn discover(docs_dir: &Path) -> Result<Vec<Document>, CorpusError> {
    if !docs_dir.is_dir() {
        return Err(CorpusError::MissingRoot(docs_dir.to_path_buf()));
    }

    let base = docs_dir.parent().unwrap_or(docs_dir);
    let mut documents = Vec::new();

    for entry in WalkDir::new(docs_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
        {
            continue;
        }

        let content = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        documents.push(read_document(path, base, content));
    }

    Ok(documents)
}

fn read_document(path: &Path, base: &Path, content: String) -> Document {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let module = segments
        .get(1)
        .map(|s| format_module(s))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let file_name = segments
        .get(2)
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string());

    Document {
        relative_path: segments.join("/"),
        module,
        chapter_title: extract_title(&content),
        file_name,
        content,
    }
}

/// Extract the first H1 heading from markdown content.
pub fn extract_title(content: &str) -> String {
    static H1: OnceLock<Regex> = OnceLock::new();
    let re = H1.get_or_init(|| Regex::new(r"(?m)^# (.+)$").expect("valid regex"));

    re.captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Human-format a module directory name: "module-1" becomes "Module 1".
fn format_module(segment: &str) -> String {
    segment
        .replace('-', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
