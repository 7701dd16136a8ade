//! Error codes for the Runsheet import diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Payload decoding errors
//! - `E1xx` - Record shape errors
//! - `W2xx` - Repairs applied to untrusted input (warnings)

use std::fmt;

/// Error codes for categorizing import diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Payload Errors (E0xx)
    // =========================================================================
    /// Empty payload.
    ///
    /// Nothing was left to decode after trimming whitespace and any
    /// markdown code fence.
    E001,

    /// Invalid JSON.
    ///
    /// The payload could not be decoded as JSON at all.
    E002,

    /// Not a list.
    ///
    /// The payload decoded as JSON, but the top-level value is not an array
    /// of segments.
    E003,

    // =========================================================================
    // Record Errors (E1xx)
    // =========================================================================
    /// Record is not an object.
    ///
    /// An element of a saved run sheet is not a JSON object.
    E100,

    /// Missing `type`.
    ///
    /// A record of a saved run sheet has no `type` key.
    E101,

    /// Missing `content`.
    ///
    /// A record of a saved run sheet has no `content` key.
    E102,

    // =========================================================================
    // Repairs (W2xx)
    // =========================================================================
    /// Duplicate header dropped.
    ///
    /// Only the first header of an imported document is kept.
    W200,

    /// Record skipped.
    ///
    /// An element of the imported list was not an object and was ignored.
    W201,

    /// Record without a usable type.
    ///
    /// The record had no type, or one that is not a string, and was kept
    /// with an empty, unrecognized type tag.
    W202,

    /// Content field discarded or kept as is.
    ///
    /// A content field or stage item had a value of the wrong shape. Scans
    /// drop it; saved run sheets keep it verbatim as an unknown key.
    W203,

    /// Id replaced.
    ///
    /// A segment or stage item reused an id already taken, or carried an id
    /// that is not a string, and was given a fresh one.
    W204,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Payload errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Record errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Repairs
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::W203 => "W203",
            ErrorCode::W204 => "W204",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Payload errors
            ErrorCode::E001 => "empty payload",
            ErrorCode::E002 => "invalid JSON",
            ErrorCode::E003 => "payload is not a list of segments",
            // Record errors
            ErrorCode::E100 => "record is not an object",
            ErrorCode::E101 => "record is missing `type`",
            ErrorCode::E102 => "record is missing `content`",
            // Repairs
            ErrorCode::W200 => "duplicate header dropped",
            ErrorCode::W201 => "record skipped",
            ErrorCode::W202 => "record without a usable type",
            ErrorCode::W203 => "content field discarded or kept as is",
            ErrorCode::W204 => "id replaced",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
