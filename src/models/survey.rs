use serde::{Deserialize, Serialize};

/// Snapshot of the language-filtered source files in a working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceFileSurvey {
    pub count: usize,
    pub total_lines: usize,
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the working tree root, `/`-separated.
    pub path: String,
    pub lines: usize,
}

impl SourceFileSurvey {
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        let total_lines = files.iter().map(|f| f.lines).sum();
        Self {
            count: files.len(),
            total_lines,
            files,
        }
    }
}
