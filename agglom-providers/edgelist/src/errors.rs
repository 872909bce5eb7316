use std::{io, num::ParseIntError};

use agglom_core::InputError;
use thiserror::Error;

/// Errors raised while reading edge-list and ground-truth text.
#[derive(Debug, Error)]
pub enum EdgeListProviderError {
    #[error("no `vertices<TAB>edges` header record found")]
    MissingHeader,
    #[error("line {line}: expected two tab-separated indices but found `{content}`")]
    MalformedRecord { line: usize, content: String },
    #[error("line {line}: `{token}` is not a vertex index")]
    InvalidIndex {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("line {line}: vertex {vertex} already mapped to original id {original}")]
    DuplicateMapping {
        line: usize,
        vertex: usize,
        original: u64,
    },
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl EdgeListProviderError {
    /// Input validation code when the records parsed but failed validation.
    #[must_use]
    pub fn input_code(&self) -> Option<agglom_core::InputErrorCode> {
        match self {
            Self::Input(error) => Some(error.code()),
            _ => None,
        }
    }
}
