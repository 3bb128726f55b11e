//! Structured findings produced while building a corpus index.
//!
//! Every problem found during a build lands here as a [`Diagnostic`] rather
//! than an early return, so a single pass reports everything wrong with a
//! corpus. `Fatal` means the subject was rejected: for per-document
//! structural findings the document is excluded and the build continues,
//! for corpus-level findings (duplicate id, prerequisite cycle) the whole
//! build aborts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnreadableFile,
    MalformedFrontMatter,
    MissingField,
    InvalidEnum,
    InvalidValue,
    UnknownPersona,
    DanglingReference,
    DuplicateDocument,
    PrerequisiteCycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub document_id: Option<String>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl Diagnostic {
    pub fn warning(
        kind: DiagnosticKind,
        document_id: impl Into<Option<String>>,
        detail: impl Into<String>,
    ) -> Self {
        Diagnostic {
            document_id: document_id.into(),
            severity: Severity::Warning,
            kind,
            detail: detail.into(),
        }
    }

    pub fn fatal(
        kind: DiagnosticKind,
        document_id: impl Into<Option<String>>,
        detail: impl Into<String>,
    ) -> Self {
        Diagnostic {
            document_id: document_id.into(),
            severity: Severity::Fatal,
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}
