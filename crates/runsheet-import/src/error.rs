//! Error and diagnostic system for Runsheet imports.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Record positions pointing at the offending array element
//! - Severity levels, so repairs can be reported as warnings
//! - Diagnostic collector for accumulating problems across a whole payload
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with an optional error code, record
//! position, and help text. Fatal diagnostics are wrapped in [`ImportError`];
//! warnings travel alongside a successful result.
//!
//! # Example
//!
//! ```
//! # use runsheet_import::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("record is missing `content`")
//!     .with_code(ErrorCode::E102)
//!     .at_record(3)
//!     .with_help("every record needs both `type` and `content`");
//! assert_eq!(diag.record(), Some(3));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod import_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use import_error::ImportError;
pub use severity::Severity;
