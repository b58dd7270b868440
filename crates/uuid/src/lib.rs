//! Identifier utilities.
//!
//! Authoring records carry three kinds of identifier:
//! - [`AssetId`]: a canonical UUID (**32 lowercase hexadecimal characters**, no hyphens) for
//!   events, symptom templates and invites.
//! - [`TimestampId`]: a time-prefixed id used for actions inside an event, so ids sort in
//!   creation order when read back from a document.
//! - [`ItemKey`]: a client-generated key for list items (lab results, findings). It exists
//!   only to address an item for update or removal and carries no clinical meaning.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`

mod service;

pub use service::{AssetId, ItemKey, TimestampId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
