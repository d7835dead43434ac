// src/documents/local.rs
// =============================================================================
// Loads every Markdown file below a folder.
//
// Each file becomes a Document whose id is its path relative to the folder,
// always with '/' separators so reports look the same on every OS.
// Files are sorted by id so two runs over the same tree produce the same
// report.
//
// `load_folder` is for the audit and insists on at least one document.
// `read_folder` is for the scan and analytics commands, where an empty
// folder is a valid (all-zero) answer.
// =============================================================================

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::Document;

pub fn load_folder(folder: &Path) -> Result<Vec<Document>> {
    let documents = read_folder(folder)?;
    if documents.is_empty() {
        bail!("No .md files found in {}", folder.display());
    }
    Ok(documents)
}

pub fn read_folder(folder: &Path) -> Result<Vec<Document>> {
    if !folder.is_dir() {
        bail!("Not a folder: {}", folder.display());
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(folder).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(folder)
            .with_context(|| format!("{} is outside {}", entry.path().display(), folder.display()))?;
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        // A file we can't read is skipped, not fatal
        match fs::read_to_string(entry.path()) {
            Ok(content) => {
                debug!(document = %id, "loaded");
                documents.push(Document::new(id, content));
            }
            Err(e) => warn!(document = %id, "Failed to read file: {}", e),
        }
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nested_markdown() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("docs/api"))?;
        fs::write(dir.path().join("README.md"), "# Project\n[home](https://a.example)")?;
        fs::write(dir.path().join("docs/api/index.MD"), "# API")?;
        fs::write(dir.path().join("docs/notes.txt"), "[skip](https://b.example)")?;

        let documents = load_folder(dir.path())?;
        let ids: Vec<_> = documents.iter().map(|d| d.id.as_str()).collect();

        assert_eq!(ids, vec!["README.md", "docs/api/index.MD"]);
        assert_eq!(documents[0].title, "Project");
        Ok(())
    }

    #[test]
    fn test_folder_without_markdown() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("notes.txt"), "nothing here")?;

        assert!(load_folder(dir.path()).is_err());
        assert!(read_folder(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_folder() {
        assert!(load_folder(Path::new("/definitely/not/here")).is_err());
        assert!(read_folder(Path::new("/definitely/not/here")).is_err());
    }
}
