//! File prompts and raw file access used by import/export.

use anyhow::Result;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub label: &'static str,
    pub pattern: &'static str,
}

/// Options handed to each save/open prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDialogOptions {
    pub filters: Vec<FileFilter>,
    pub default_extension: &'static str,
}

impl FileDialogOptions {
    /// "Json file" first, "All files" as fallback, `json` as default extension.
    pub fn json() -> Self {
        Self {
            filters: vec![
                FileFilter { label: "Json file", pattern: "*.json" },
                FileFilter { label: "All files", pattern: "*.*" },
            ],
            default_extension: "json",
        }
    }

    /// Append the default extension when the user typed a bare file name.
    pub fn apply_default_extension(&self, path: PathBuf) -> PathBuf {
        if path.extension().is_some() || self.default_extension.is_empty() {
            path
        } else {
            path.with_extension(self.default_extension)
        }
    }

    /// "Json file (*.json) | All files (*.*)"
    pub fn describe(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("{} ({})", f.label, f.pattern))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Asks the user for paths and moves text in and out of files.
///
/// Prompts return `Ok(None)` when the user cancels. The read/write defaults go
/// straight to the filesystem; each call opens and closes its own handle.
pub trait FileGateway {
    fn prompt_save_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>>;

    fn prompt_open_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>>;

    fn read_all_text(&mut self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    /// Always overwrites.
    fn write_all_text(&mut self, path: &Path, text: &str) -> io::Result<()> {
        fs::write(path, text)
    }
}
