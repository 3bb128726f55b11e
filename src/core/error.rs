use crate::core::diagnostics::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoursemapError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("duplicate document id '{id}' ({first} and {second})")]
    DuplicateDocument {
        id: String,
        first: String,
        second: String,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("prerequisite cycle: {}", .cycle.join(" -> "))]
    PrerequisiteCycle {
        cycle: Vec<String>,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("not found: {0}")]
    NotFound(String),
}

impl CoursemapError {
    /// Diagnostics collected up to the point of failure. Corpus-fatal errors
    /// carry everything gathered before the abort so a cycle is reported
    /// alongside earlier per-document findings, never in isolation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CoursemapError::DuplicateDocument { diagnostics, .. }
            | CoursemapError::PrerequisiteCycle { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}
