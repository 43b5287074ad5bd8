//! # Error Types
//!
//! This module defines error types used throughout the tb365 library.
//!
//! Document problems are fatal and carry the stage that rejected them.
//! Data problems never show up here: the variable replacer reports them as
//! `missing` entries and warnings instead.

use std::fmt;

use thiserror::Error;

/// Parse stage that rejected a canvas document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Required top-level fields (`projectName`, `version`, `canvasState`).
    Structure,
    /// Canvas properties (`canvasSize`, `zoom`, `gridSize`, ...).
    Canvas,
    /// Per-element base and type-specific fields.
    Element,
}

impl ParseStage {
    /// Stage name as reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStage::Structure => "structure_validation",
            ParseStage::Canvas => "canvas_validation",
            ParseStage::Element => "element_validation",
        }
    }
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document rejected by the parser, with every violation found in that stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub stage: ParseStage,
    pub errors: Vec<String>,
}

impl ParseError {
    pub fn new(stage: ParseStage, errors: Vec<String>) -> Self {
        Self { stage, errors }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.errors.join("; "))
    }
}

impl std::error::Error for ParseError {}

/// Main error type for tb365 operations
#[derive(Debug, Error)]
pub enum Tb365Error {
    /// Top-level request shape violations (schema validator)
    #[error("Invalid request: {}", .0.join("; "))]
    Request(Vec<String>),

    /// Canvas document rejected by the parser
    #[error("Invalid document: {0}")]
    Parse(#[from] ParseError),

    /// HTML synthesis failed; this is a defect, not an input problem
    #[error("Generation error: {0}")]
    Generation(String),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server error (bind, accept)
    #[error("Server error: {0}")]
    Server(String),
}

impl Tb365Error {
    /// Name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Tb365Error::Request(_) => "schema_validation",
            Tb365Error::Parse(e) => e.stage.as_str(),
            Tb365Error::Generation(_) => "generation",
            Tb365Error::Json(_) => "json",
            Tb365Error::Io(_) => "io",
            Tb365Error::Server(_) => "server",
        }
    }

    /// Itemized messages for input errors, empty for everything else.
    pub fn violations(&self) -> &[String] {
        match self {
            Tb365Error::Request(errors) => errors,
            Tb365Error::Parse(e) => &e.errors,
            _ => &[],
        }
    }

    /// True for errors caused by the caller's input rather than a defect.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Tb365Error::Request(_) | Tb365Error::Parse(_) | Tb365Error::Json(_)
        )
    }
}
