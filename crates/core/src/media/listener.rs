//! Bus listener maintaining the media state registry and enforcing the
//! single-playback policy.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use tabshell_types::PlaybackState;

use crate::bus::EventBus;
use crate::events::{Event, MediaActivated, MediaDeactivated, MediaMetadataChanged, MediaStateChanged};
use crate::media::registry::MediaStateRegistry;
use crate::task::TaskGuard;

/// Independent task draining media events into the state registry.
pub struct MediaEventListener {
	guard: TaskGuard,
}

impl MediaEventListener {
	/// Spawns the listener. Dropping the returned value (or calling
	/// [`cancel`](Self::cancel)) stops it.
	pub fn spawn(bus: &EventBus, registry: Arc<MediaStateRegistry>) -> Self {
		let mut events = bus.subscribe();
		let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

		tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = &mut cancel_rx => break,
					event = events.next() => {
						let Some(event) = event else { break };
						handle_event(&registry, event).await;
					}
				}
			}
		});

		Self {
			guard: TaskGuard::new(cancel_tx),
		}
	}

	/// Stops the listener. Idempotent.
	pub fn cancel(&mut self) {
		self.guard.cancel();
	}
}

async fn handle_event(registry: &MediaStateRegistry, event: Event) {
	match event {
		Event::MediaActivated(MediaActivated { tab_id, handle }) => {
			registry.register(tab_id, handle);
		}
		Event::MediaDeactivated(MediaDeactivated { tab_id }) => {
			if !registry.unregister(&tab_id) {
				debug!(target = "tabshell.media", tab = %tab_id, "deactivation for untracked tab; ignoring");
			}
		}
		Event::MediaMetadataChanged(MediaMetadataChanged { tab_id, metadata, .. }) => {
			if !registry.update_metadata(&tab_id, metadata) {
				debug!(target = "tabshell.media", tab = %tab_id, "metadata for untracked tab; ignoring");
			}
		}
		Event::MediaStateChanged(MediaStateChanged { tab_id, state, .. }) => {
			// Pause decision must be read before the new state is recorded;
			// recording `Play` moves the playing marker to the new tab.
			let displaced = match state {
				PlaybackState::Play => registry.tab_to_pause_for_new_playback(&tab_id),
				PlaybackState::Pause | PlaybackState::Stop => None,
			};

			if !registry.update_state(&tab_id, state) {
				debug!(target = "tabshell.media", tab = %tab_id, "state change for untracked tab; ignoring");
				return;
			}

			// Enforcement: pause the displaced tab after the new tab's
			// state is recorded. A misbehaving tab fails here without
			// blocking the new playback.
			if let Some(previous) = displaced {
				if let Err(err) = previous.handle.pause().await {
					warn!(target = "tabshell.media", tab = %previous.tab_id, error = %err, "failed to pause displaced tab");
				}
			}
		}
		// Tab lifecycle events belong to the session listener.
		_ => {}
	}
}
