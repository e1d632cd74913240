//! Shared domain types for the tabshell coordination core.
//!
//! Plain data only: identities, descriptors, store records, and media
//! playback types. No async machinery lives here; the coordination core and
//! external collaborators both depend on this crate so neither has to depend
//! on the other's internals.

/// Media playback state and metadata types.
pub mod media;
/// Session identity, descriptor, and store record types.
pub mod session;

pub use media::{Artwork, MediaMetadata, PlaybackState};
pub use session::{SessionDescriptor, SessionId, SessionRecord, TabId};
