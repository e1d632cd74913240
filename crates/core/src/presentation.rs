//! Presentation adapter surface for the background media service.
//!
//! The adapter is the OS-facing side of media playback (notification, system
//! media session). It only receives state snapshots; user actions it
//! collects flow back through the coordinator's [`UserAction`] channel.

use async_trait::async_trait;
use tabshell_types::{MediaMetadata, PlaybackState, TabId};

use crate::engine::MediaHandle;

/// External presentation of the background media service.
///
/// All calls are fire-and-forget from the coordinator's perspective:
/// failures are logged at the call site and never retried.
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
	/// Starts the service for `owner`. The coordinator guarantees it never
	/// calls this twice for the same owner without an intervening `stop`.
	async fn start(&self, owner: &TabId, handle: MediaHandle, initial_state: PlaybackState) -> anyhow::Result<()>;
	async fn update_state(&self, state: PlaybackState) -> anyhow::Result<()>;
	async fn update_metadata(&self, metadata: &MediaMetadata) -> anyhow::Result<()>;
	async fn stop(&self) -> anyhow::Result<()>;
}

/// User-initiated transport action emitted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
	Play,
	Pause,
	Stop,
	NextTrack,
	PreviousTrack,
}
