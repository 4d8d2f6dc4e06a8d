//! Error types for Pathgate Core.

use thiserror::Error;

/// Grammar violations reported by the canonicalizer.
///
/// Positions are byte offsets into the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path must start with '/'")]
    MissingLeadingSlash,

    #[error("the root path '/' is only valid as a prefix")]
    RootNotAllowed,

    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },

    #[error("trailing '/' at position {position}")]
    TrailingSlash { position: usize },

    #[error("illegal character {ch:?} at position {position}")]
    IllegalCharacter { ch: char, position: usize },

    #[error("'.' not allowed at position {position}")]
    DotNotAllowed { position: usize },

    #[error("more than one '.' in final segment at position {position}")]
    MultipleDots { position: usize },

    #[error("final segment may not start or end with '.' (position {position})")]
    DotAtSegmentEdge { position: usize },
}

impl PathError {
    /// Short machine-readable name of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            PathError::Empty => "empty",
            PathError::MissingLeadingSlash => "missing-leading-slash",
            PathError::RootNotAllowed => "root-not-allowed",
            PathError::EmptySegment { .. } => "empty-segment",
            PathError::TrailingSlash { .. } => "trailing-slash",
            PathError::IllegalCharacter { .. } => "illegal-character",
            PathError::DotNotAllowed { .. } => "dot-not-allowed",
            PathError::MultipleDots { .. } => "multiple-dots",
            PathError::DotAtSegmentEdge { .. } => "dot-at-segment-edge",
        }
    }

    /// Byte offset of the violation, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            PathError::Empty | PathError::MissingLeadingSlash | PathError::RootNotAllowed => None,
            PathError::EmptySegment { position }
            | PathError::TrailingSlash { position }
            | PathError::IllegalCharacter { position, .. }
            | PathError::DotNotAllowed { position }
            | PathError::MultipleDots { position }
            | PathError::DotAtSegmentEdge { position } => Some(*position),
        }
    }
}

/// Core errors outside the path grammar.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid address: {0}")]
    Address(String),
}
