//! Shared data types for gamenest.
//!
//! Everything here is plain data with no I/O: source kinds, composite game
//! identifiers, per-folder metadata records and library entries. Behaviour
//! lives in `gamenest-lib`.

pub mod entry;
pub mod game_id;
pub mod metadata;
pub mod source;
pub mod util;

pub use entry::LibraryEntry;
pub use game_id::{GameId, GameIdError};
pub use metadata::{GameMetadata, MetadataPatch};
pub use source::{SourceKind, SourceParseError};
