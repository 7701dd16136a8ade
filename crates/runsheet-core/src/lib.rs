//! Runsheet Core Types and Definitions
//!
//! This crate provides the foundational types for Runsheet documents, the
//! ordered run sheets used to drive live-event production. It includes:
//!
//! - **Identifiers**: Opaque, never-reused segment and stage item ids ([`identifier`] module)
//! - **Segments**: The typed units of a run sheet ([`segment::Segment`])
//! - **Stage**: Props placed on a stage diagram in normalized coordinates ([`stage`] module)
//! - **Sanitize**: Free-text cleanup applied to title fields ([`sanitize`] module)

pub mod identifier;
pub mod sanitize;
pub mod segment;
pub mod stage;
