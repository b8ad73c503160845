use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures surfaced by orchestrator commands.
///
/// Missing API keys and cancelled prompts are not errors and never show up here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown page '{0}'. Known pages: temperature, configuration.")]
    UnknownPage(String),

    #[error("There are no readings to export yet.")]
    NothingToExport,

    #[error("Failed to read file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File {} is not a JSON array of temperature readings", .path.display())]
    MalformedImport {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize readings to JSON")]
    Serialize(#[source] serde_json::Error),

    /// Prompt, settings or provider failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
