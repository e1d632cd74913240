//! Presentation-service lifecycle driven by bus events.
//!
//! Starts and stops the external presentation adapter as tabs activate and
//! deactivate media. Stopping is debounced: a deactivation only takes effect
//! after a quiet window, so the rapid deactivate/activate pairs produced by
//! tab switching never flap the background service.

use std::mem;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

use tabshell_types::{MediaMetadata, PlaybackState, TabId};

use crate::bus::EventBus;
use crate::config::CoordinatorConfig;
use crate::engine::MediaHandle;
use crate::events::{Event, MediaActivated, MediaDeactivated, MediaMetadataChanged, MediaStateChanged};
use crate::presentation::{PresentationAdapter, UserAction};
use crate::task::TaskGuard;
use crate::timer::DelayedTask;

/// Presentation-service state machine.
///
/// `Draining` keeps the service running while the stop debounce timer is
/// pending; a fresh activation for the same owner collapses it back to
/// `Running` without the adapter ever seeing a stop.
enum ServiceState {
	Stopped,
	Running { owner: TabId, handle: MediaHandle },
	Draining { owner: TabId, handle: MediaHandle, timer: DelayedTask },
}

impl ServiceState {
	fn owner(&self) -> Option<&TabId> {
		match self {
			ServiceState::Stopped => None,
			ServiceState::Running { owner, .. } | ServiceState::Draining { owner, .. } => Some(owner),
		}
	}

	fn handle(&self) -> Option<&MediaHandle> {
		match self {
			ServiceState::Stopped => None,
			ServiceState::Running { handle, .. } | ServiceState::Draining { handle, .. } => Some(handle),
		}
	}
}

struct CoordinatorInner {
	adapter: Arc<dyn PresentationAdapter>,
	config: CoordinatorConfig,
	// tokio Mutex: transitions await adapter calls while holding the state.
	state: Mutex<ServiceState>,
}

/// Listens to media events on the bus and drives the presentation adapter.
pub struct MediaPlaybackCoordinator {
	inner: Arc<CoordinatorInner>,
	actions_tx: mpsc::UnboundedSender<UserAction>,
	listener: TaskGuard,
}

impl MediaPlaybackCoordinator {
	/// Spawns the coordinator's listener task over `bus`.
	pub fn spawn(bus: &EventBus, adapter: Arc<dyn PresentationAdapter>, config: CoordinatorConfig) -> Self {
		let inner = Arc::new(CoordinatorInner {
			adapter,
			config,
			state: Mutex::new(ServiceState::Stopped),
		});
		let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();
		let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

		let mut events = bus.subscribe();
		let task_inner = Arc::clone(&inner);
		tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = &mut cancel_rx => break,
					event = events.next() => {
						let Some(event) = event else { break };
						task_inner.handle_event(event).await;
					}
					action = actions_rx.recv() => {
						let Some(action) = action else { break };
						task_inner.handle_user_action(action).await;
					}
				}
			}
		});

		Self {
			inner,
			actions_tx,
			listener: TaskGuard::new(cancel_tx),
		}
	}

	/// Sender the presentation layer uses to feed user actions
	/// (notification buttons) back into the coordinator.
	pub fn user_actions(&self) -> mpsc::UnboundedSender<UserAction> {
		self.actions_tx.clone()
	}

	/// Whether the presentation service is running, including the debounce
	/// window after a deactivation.
	pub async fn is_service_running(&self) -> bool {
		!matches!(*self.inner.state.lock().await, ServiceState::Stopped)
	}

	/// Tab currently owning the presentation service, if any.
	pub async fn active_owner(&self) -> Option<TabId> {
		self.inner.state.lock().await.owner().cloned()
	}

	/// Cancels any pending stop timer, force-stops the service, and stops
	/// the listener. Idempotent; called once at shell teardown.
	pub async fn shutdown(&mut self) {
		self.listener.cancel();

		let mut state = self.inner.state.lock().await;
		match mem::replace(&mut *state, ServiceState::Stopped) {
			ServiceState::Stopped => {}
			ServiceState::Running { owner, .. } | ServiceState::Draining { owner, .. } => {
				debug!(target = "tabshell.media", tab = %owner, "force-stopping presentation service");
				if let Err(err) = self.inner.adapter.stop().await {
					warn!(target = "tabshell.media", error = %err, "presentation stop failed");
				}
			}
		}
	}
}

impl CoordinatorInner {
	async fn handle_event(self: &Arc<Self>, event: Event) {
		match event {
			Event::MediaActivated(MediaActivated { tab_id, handle }) => self.on_activated(tab_id, handle).await,
			Event::MediaDeactivated(MediaDeactivated { tab_id }) => self.on_deactivated(tab_id).await,
			Event::MediaStateChanged(MediaStateChanged { tab_id, state, .. }) => self.on_state_changed(tab_id, state).await,
			Event::MediaMetadataChanged(MediaMetadataChanged { tab_id, metadata, .. }) => self.on_metadata_changed(tab_id, metadata).await,
			// Tab lifecycle events belong to the session listener.
			_ => {}
		}
	}

	async fn on_activated(self: &Arc<Self>, tab_id: TabId, handle: MediaHandle) {
		let mut state = self.state.lock().await;
		match mem::replace(&mut *state, ServiceState::Stopped) {
			ServiceState::Stopped => {
				*state = self.start_service(tab_id, handle).await;
			}
			ServiceState::Running { owner, .. } if owner == tab_id => {
				// Already running for this owner; keep the newest handle.
				*state = ServiceState::Running { owner, handle };
			}
			ServiceState::Running { owner, .. } => {
				debug!(target = "tabshell.media", old = %owner, new = %tab_id, "media owner changed; restarting service");
				self.stop_adapter().await;
				*state = self.start_service(tab_id, handle).await;
			}
			ServiceState::Draining { owner, mut timer, .. } if owner == tab_id => {
				// Deactivate/activate flap within the window: the service
				// never stopped, so only the timer goes away.
				timer.cancel();
				*state = ServiceState::Running { owner, handle };
			}
			ServiceState::Draining { owner, mut timer, .. } => {
				timer.cancel();
				debug!(target = "tabshell.media", old = %owner, new = %tab_id, "media owner changed during drain; restarting service");
				self.stop_adapter().await;
				*state = self.start_service(tab_id, handle).await;
			}
		}
	}

	async fn on_deactivated(self: &Arc<Self>, tab_id: TabId) {
		let mut state = self.state.lock().await;
		match mem::replace(&mut *state, ServiceState::Stopped) {
			ServiceState::Running { owner, handle } if owner == tab_id => {
				let timer = self.schedule_stop(owner.clone());
				*state = ServiceState::Draining { owner, handle, timer };
			}
			ServiceState::Draining { owner, handle, mut timer } if owner == tab_id => {
				// Re-arm: cancel and reschedule.
				timer.cancel();
				let timer = self.schedule_stop(owner.clone());
				*state = ServiceState::Draining { owner, handle, timer };
			}
			other => {
				debug!(target = "tabshell.media", tab = %tab_id, "stale media deactivation; ignoring");
				*state = other;
			}
		}
	}

	async fn on_state_changed(&self, tab_id: TabId, playback: PlaybackState) {
		let state = self.state.lock().await;
		if state.owner() == Some(&tab_id) {
			if let Err(err) = self.adapter.update_state(playback).await {
				warn!(target = "tabshell.media", tab = %tab_id, error = %err, "presentation state update failed");
			}
		} else {
			debug!(target = "tabshell.media", tab = %tab_id, "state change for tab without running service; dropped");
		}
	}

	async fn on_metadata_changed(&self, tab_id: TabId, metadata: MediaMetadata) {
		let state = self.state.lock().await;
		if state.owner() == Some(&tab_id) {
			if let Err(err) = self.adapter.update_metadata(&metadata).await {
				warn!(target = "tabshell.media", tab = %tab_id, error = %err, "presentation metadata update failed");
			}
		} else {
			debug!(target = "tabshell.media", tab = %tab_id, "metadata for tab without running service; dropped");
		}
	}

	async fn handle_user_action(&self, action: UserAction) {
		let state = self.state.lock().await;
		let Some(handle) = state.handle() else {
			debug!(target = "tabshell.media", ?action, "user action with no active media owner; dropped");
			return;
		};

		let result = match action {
			UserAction::Play => handle.play().await,
			UserAction::Pause => handle.pause().await,
			UserAction::Stop => handle.stop().await,
			UserAction::NextTrack => handle.next_track().await,
			UserAction::PreviousTrack => handle.previous_track().await,
		};
		if let Err(err) = result {
			warn!(target = "tabshell.media", ?action, error = %err, "media session call failed");
		}
	}

	/// Starts the adapter for a new owner. The caller has already stopped
	/// the service for any previous owner.
	async fn start_service(&self, tab_id: TabId, handle: MediaHandle) -> ServiceState {
		if let Err(err) = self.adapter.start(&tab_id, handle.clone(), PlaybackState::Play).await {
			warn!(target = "tabshell.media", tab = %tab_id, error = %err, "presentation start failed");
		}
		ServiceState::Running { owner: tab_id, handle }
	}

	async fn stop_adapter(&self) {
		if let Err(err) = self.adapter.stop().await {
			warn!(target = "tabshell.media", error = %err, "presentation stop failed");
		}
	}

	fn schedule_stop(self: &Arc<Self>, tab_id: TabId) -> DelayedTask {
		let inner = Arc::clone(self);
		DelayedTask::schedule(self.config.stop_debounce(), async move {
			inner.finish_stop(tab_id).await;
		})
	}

	/// Debounce expiry: stop the service unless a newer activation
	/// superseded the drain in the meantime.
	async fn finish_stop(&self, tab_id: TabId) {
		let mut state = self.state.lock().await;
		let draining_for_tab = matches!(&*state, ServiceState::Draining { owner, .. } if *owner == tab_id);
		if !draining_for_tab {
			return;
		}

		*state = ServiceState::Stopped;
		debug!(target = "tabshell.media", tab = %tab_id, "debounce elapsed; stopping presentation service");
		self.stop_adapter().await;
	}
}
