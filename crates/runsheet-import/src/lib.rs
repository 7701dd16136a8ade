//! Import paths for Runsheet documents.
//!
//! Two decoders turn text into an ordered list of
//! [`Segment`](runsheet_core::segment::Segment)s:
//!
//! - [`normalize`] repairs the untrusted output of an external
//!   document-understanding service: fresh ids, sanitized titles, a single
//!   header, and reclassified session and stage diagram notes.
//! - [`interchange`] reads and writes the self-describing export format,
//!   trusting its own prior output and applying no repairs.
//!
//! Both report problems through the [`error`] module and never leave a
//! partially decoded result behind: a payload is accepted whole or rejected.

pub mod error;
pub mod interchange;

mod fence;
mod normalize;
mod record;

pub use error::ImportError;
pub use normalize::{Imported, normalize};
