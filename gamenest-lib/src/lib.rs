//! Library behaviour for gamenest.
//!
//! Custom game discovery (sidecar identity, id allocation, the discovery
//! index, executable and icon lookup, background enrichment), persisted
//! settings, and the launch-time cloud sync coordinator. Frontends drive
//! these through [`LibraryScanner`] and [`LaunchSyncCoordinator`].

pub mod discovery;
pub mod enrich;
pub mod error;
pub mod executables;
pub mod icons;
pub mod identity;
pub mod launch;
pub mod scanner;
pub mod settings;
pub mod sidecar;

pub use discovery::{DiscoveryCache, FolderSource};
pub use enrich::{ArtworkFetcher, EnrichmentHook, EnrichmentJob, EnrichmentPool};
pub use error::EnrichError;
pub use icons::IconExtractor;
pub use identity::IdentityAllocator;
pub use launch::{LaunchDecision, LaunchRequest, LaunchSyncCoordinator};
pub use scanner::{LibraryScanner, RootCount};
pub use settings::LibrarySettings;
pub use sidecar::SidecarStore;

// Re-export core types so frontends can depend on this crate alone.
pub use gamenest_core::{
    GameId, GameIdError, GameMetadata, LibraryEntry, MetadataPatch, SourceKind,
};
