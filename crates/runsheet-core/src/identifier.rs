//! Opaque identifiers for segments and stage items.
//!
//! This module provides [`SegmentId`] and [`StageItemId`]. Both wrap an
//! opaque string that is stable for the lifetime of the thing it names.
//! Freshly generated ids come from random v4 UUIDs, so an id is never
//! reused after the segment or item it named has been deleted.
//!
//! Ids read back from an interchange file keep whatever string they were
//! saved with; nothing here assumes the UUID shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a fresh id that has never been handed out before.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

opaque_id!(
    /// Identity of a [`Segment`](crate::segment::Segment), unique within a document.
    ///
    /// # Examples
    ///
    /// ```
    /// use runsheet_core::identifier::SegmentId;
    ///
    /// let fixed = SegmentId::new("ca-header");
    /// assert_eq!(fixed, "ca-header");
    ///
    /// let fresh = SegmentId::generate();
    /// assert_ne!(fresh, SegmentId::generate());
    /// ```
    SegmentId
);

opaque_id!(
    /// Identity of a [`StageItem`](crate::stage::StageItem), unique within its diagram.
    StageItemId
);
