//! Source file survey of a working tree.
//!
//! Walks the tree for files with the target extension, pruning directories
//! whose name is reserved (VCS metadata, build and binary output). Files that
//! cannot be read or decoded are skipped with a warning.

use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::Result;
use crate::models::{SourceFile, SourceFileSurvey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyOptions {
    /// Extension without the leading dot.
    pub extension: String,
    /// Directory names excluded anywhere in the tree.
    pub exclude_dirs: Vec<String>,
}

impl Default for SurveyOptions {
    fn default() -> Self {
        Self {
            extension: "java".to_string(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

pub fn default_exclude_dirs() -> Vec<String> {
    [".git", "target", "build", "bin"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn survey_source_files(root: &Path, options: &SurveyOptions) -> Result<SourceFileSurvey> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, options));

    let mut files = Vec::new();
    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                tracing::warn!("Skipping unreadable path during survey: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), &options.extension) {
            continue;
        }

        match fs::read_to_string(entry.path()) {
            Ok(content) => files.push(SourceFile {
                path: relative_path(root, entry.path()),
                lines: content.lines().count(),
            }),
            Err(e) => {
                tracing::warn!("Could not process {}: {}", entry.path().display(), e);
            }
        }
    }

    Ok(SourceFileSurvey::from_files(files))
}

fn is_excluded_dir(entry: &DirEntry, options: &SurveyOptions) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && options
            .exclude_dirs
            .iter()
            .any(|name| entry.file_name().to_string_lossy() == name.as_str())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
