//! Application-wide error types.
//!
//! Library modules return [`Error`] via `thiserror`, while the CLI layer
//! uses `anyhow` for convenient propagation.
//!
//! Parse problems in a sources file are not errors: they are collected as
//! [`crate::round::ParseWarning`] values and parsing continues.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sources file could not be read. Fatal, nothing is parsed.
    #[error("Cannot read sources file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external tool could not be located
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// An external collaborator (downloader, ffmpeg) failed.
    ///
    /// `index` is the round item the call was made for, `None` for work
    /// shared between items such as a silence clip or the final concatenation.
    #[error("{tool} failed{}: {message}", .index.map(|i| format!(" for item {i}")).unwrap_or_default())]
    Collaborator {
        index: Option<usize>,
        tool: String,
        message: String,
    },

    /// A spawned task panicked or was aborted
    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a collaborator error for a specific round item.
    pub fn collaborator(
        index: Option<usize>,
        tool: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Collaborator {
            index,
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Attribute a failure to a round item.
    ///
    /// Collaborator errors keep their tool and message; anything else is
    /// wrapped as a collaborator failure of that item.
    pub fn at_item(self, index: usize) -> Self {
        match self {
            Self::Collaborator { tool, message, .. } => Self::Collaborator {
                index: Some(index),
                tool,
                message,
            },
            other => Self::Collaborator {
                index: Some(index),
                tool: "collaborator".to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Index of the round item this error belongs to, if any.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Self::Collaborator { index, .. } => *index,
            Self::WithContext { source, .. } => source.item_index(),
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
