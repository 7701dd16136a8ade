//! Error types for run sheet operations.
//!
//! [`RunSheetError`] covers everything an operation can report to the
//! operator. Referring to a segment that does not exist is not an error:
//! those operations leave the document unchanged.

use std::{io, path::PathBuf};

use thiserror::Error;

use runsheet_import::ImportError;

use crate::{service::ServiceError, store::StoreError};

/// The main error type for run sheet operations.
///
/// A failed operation never changes the current document.
#[derive(Debug, Error)]
pub enum RunSheetError {
    /// An interchange file or a layout reader response could not be decoded.
    #[error("{0}")]
    MalformedInput(#[from] ImportError),

    /// The layout reader could not be reached or refused the request.
    #[error("Layout reader unavailable: {0}")]
    ServiceUnavailable(#[from] ServiceError),

    /// No import path handles files like this one.
    #[error("Unsupported file type `{}`: expected a .json run sheet or a .pdf scan", .path.display())]
    UnsupportedInputKind { path: PathBuf },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RunSheetError {
    /// Returns the import diagnostics when this is a decoding failure.
    pub fn import_error(&self) -> Option<&ImportError> {
        match self {
            RunSheetError::MalformedInput(err) => Some(err),
            _ => None,
        }
    }
}
