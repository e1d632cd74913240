//! Bus listener persisting tab lifecycle events into the session registry.
//!
//! Engine-initiated tab changes (`window.open`, scripted closes, navigation
//! updates) arrive as bus events; manager-driven changes write the registry
//! directly and publish nothing. Both writers are idempotent, so neither
//! cares which one ran first.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use tabshell_types::SessionDescriptor;

use crate::bus::EventBus;
use crate::events::{Event, TabClosed, TabCreated, TabInfoChanged};
use crate::session::registry::SessionRegistry;
use crate::task::TaskGuard;

/// Independent task draining tab lifecycle events.
pub struct SessionEventListener {
	guard: TaskGuard,
}

impl SessionEventListener {
	/// Spawns the listener. Dropping the returned value (or calling
	/// [`cancel`](Self::cancel)) stops it.
	pub fn spawn(bus: &EventBus, registry: Arc<SessionRegistry>) -> Self {
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

async fn handle_event(registry: &SessionRegistry, event: Event) {
	match event {
		Event::TabCreated(TabCreated { tab_id, url }) => {
			match registry.get_session(&tab_id).await {
				Ok(Some(_)) => {
					debug!(target = "tabshell.session", session = %tab_id, "created tab already registered");
				}
				Ok(None) => {
					let descriptor = SessionDescriptor {
						id: tab_id.clone(),
						url,
						title: String::new(),
						incognito: false,
						media_session: false,
					};
					if let Err(err) = registry.add_session(&descriptor).await {
						warn!(target = "tabshell.session", session = %tab_id, error = %err, "failed to persist created tab");
					}
				}
				Err(err) => {
					warn!(target = "tabshell.session", session = %tab_id, error = %err, "store lookup for created tab failed");
				}
			}
		}
		Event::TabInfoChanged(TabInfoChanged { tab_id, url, title }) => {
			if let Err(err) = registry.update_session_info(&tab_id, &url, &title).await {
				warn!(target = "tabshell.session", session = %tab_id, error = %err, "failed to persist tab info change");
			}
		}
		Event::TabClosed(TabClosed { tab_id }) => {
			if let Err(err) = registry.remove_session(&tab_id).await {
				warn!(target = "tabshell.session", session = %tab_id, error = %err, "failed to remove closed tab");
			}
		}
		// Media events belong to the media listener.
		_ => {}
	}
}
