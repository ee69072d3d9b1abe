use std::{fmt, io};

use thiserror::Error;

/// Represents a byte span within a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Classification of a diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Parser,
    Runtime,
    Io,
}

/// An interpreter-level error raised while loading or evaluating source.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Runtime, message)
    }

    /// Wraps an OS-level failure as `"<context> (<code>)"`, falling back to
    /// the error kind when the platform reports no code.
    pub fn io(context: &str, err: &io::Error) -> Self {
        let message = match err.raw_os_error() {
            Some(code) => format!("{context} ({code})"),
            None => format!("{context} ({})", err.kind()),
        };
        Self::new(DiagnosticKind::Io, message).with_note(err.to_string())
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Unified error type for everything the engine and loader can raise.
#[derive(Debug, Error)]
pub enum MuError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MuError {
    /// The single-line message shown to the user.
    pub fn message(&self) -> String {
        match self {
            MuError::Diagnostic(diag) => diag.to_string(),
            MuError::Io(err) => format!("io error ({err})"),
        }
    }
}

pub type Result<T> = std::result::Result<T, MuError>;
