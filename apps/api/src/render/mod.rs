//! Document rendering — LaTeX generation and PDF compilation.
//!
//! `template` fills the fixed résumé asset from structured content and
//! `cover_letter` does the same for the letter asset; `compiler`
//! turns the LaTeX into a PDF artifact, falling back from the primary compiler
//! to the alternate one and finally to a minimal generated PDF.

pub mod artifacts;
pub mod compiler;
pub mod cover_letter;
pub mod escape;
pub mod fallback_pdf;
pub mod handlers;
pub mod process;
pub mod sections;
pub mod template;
pub mod workspace;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),

    #[error("workspace {} is not writable: {source}", path.display())]
    WorkspaceUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{compiler} timed out after {}s", timeout.as_secs())]
    Timeout { compiler: String, timeout: Duration },

    #[error("{compiler} failed: {message}")]
    CompilerFailed { compiler: String, message: String },

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("pdf generation failed: {0}")]
    Pdf(String),
}

impl RenderError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
