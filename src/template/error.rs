// ABOUTME: Error types for template loading and rendering
// ABOUTME: Separates missing templates, unreadable files and evaluation failures

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read template {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error rendering template for mail[{mail_id}]: {source}")]
    RenderError {
        mail_id: String,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("Snippet render error: {0}")]
    SnippetError(#[source] handlebars::RenderError),

    #[error("Template syntax error: {0}")]
    SyntaxError(String),

    #[error("Plain text conversion error: {0}")]
    ConversionError(String),
}

/// Coarse classification callers use to decide whether to retry, skip or escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Io,
    Render,
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::NotFound { .. } => ErrorKind::NotFound,
            TemplateError::IoError { .. } => ErrorKind::Io,
            TemplateError::RenderError { .. }
            | TemplateError::SnippetError(_)
            | TemplateError::SyntaxError(_)
            | TemplateError::ConversionError(_) => ErrorKind::Render,
        }
    }

    /// Classify an I/O failure for `path`.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            TemplateError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            TemplateError::IoError {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Path of a snippet or template file that was missing somewhere in the cause chain.
    ///
    /// Snippets are rendered from inside helpers, so a missing snippet surfaces as a
    /// render error wrapping the original `NotFound`.
    pub fn missing_path(&self) -> Option<&Path> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(TemplateError::NotFound { path }) = err.downcast_ref::<TemplateError>() {
                return Some(path);
            }
            current = err.source();
        }
        None
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
