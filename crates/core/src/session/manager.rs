//! Session orchestration: create, open, minimize, close.
//!
//! The manager composes the registry, runtime cache, focus controller, and
//! the external session factory. It is the only writer of the reactive
//! "current session" value and publishes no bus events itself; callers
//! observe outcomes through the registry and the current-session watch.
//!
//! Per-session states, from this component's viewpoint: unknown →
//! registered (descriptor only) → materialized in the background →
//! materialized in the foreground (at most one) → closed. The ordering rule
//! that keeps the single-foreground invariant structural: the previous
//! current session is backgrounded *before* a new handle becomes current.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use tabshell_types::{SessionDescriptor, SessionId};

use crate::engine::{EngineHandle, SessionFactory};
use crate::error::{Result, ShellError};
use crate::session::cache::SessionRuntimeCache;
use crate::session::focus::FocusController;
use crate::session::registry::SessionRegistry;

/// The session currently attached to the shell's foreground slot.
#[derive(Debug, Clone)]
pub struct CurrentSession {
	pub id: SessionId,
	pub engine: EngineHandle,
}

pub struct SessionManager {
	registry: Arc<SessionRegistry>,
	cache: Arc<SessionRuntimeCache>,
	factory: Arc<dyn SessionFactory>,
	focus: FocusController,
	current_tx: watch::Sender<Option<CurrentSession>>,
}

impl SessionManager {
	pub fn new(registry: Arc<SessionRegistry>, cache: Arc<SessionRuntimeCache>, factory: Arc<dyn SessionFactory>) -> Self {
		let (current_tx, _) = watch::channel(None);
		Self {
			registry,
			cache,
			factory,
			focus: FocusController,
			current_tx,
		}
	}

	/// Reactive view of the currently attached session.
	pub fn current_session(&self) -> watch::Receiver<Option<CurrentSession>> {
		self.current_tx.subscribe()
	}

	fn current(&self) -> Option<CurrentSession> {
		self.current_tx.borrow().clone()
	}

	/// Creates a new session, makes it foreground, and materializes its
	/// engine. Returns the new id so the caller can navigate once the
	/// current-session value updates.
	pub async fn create_session(&self, url: &str, incognito: bool) -> Result<SessionId> {
		let id = SessionId::generate();
		let descriptor = SessionDescriptor {
			id: id.clone(),
			url: url.to_string(),
			title: String::new(),
			incognito,
			media_session: false,
		};

		self.registry.add_session(&descriptor).await?;
		self.registry.set_foreground_session(Some(id.clone()));

		let engine = match self.factory.create(&id, url, incognito).await {
			Ok(engine) => engine,
			Err(source) => {
				// The descriptor stays registered for a later lazy open, but
				// a session that never materialized must not keep the
				// foreground slot.
				self.registry.set_foreground_session(None);
				return Err(ShellError::Factory { id, source });
			}
		};

		// The old current session must lose the slot before the new handle
		// takes it; both holding it at once is the bug this ordering exists
		// to prevent.
		if let Some(previous) = self.current() {
			self.focus.background(&previous.engine);
		}

		self.cache.insert(id.clone(), engine.clone());
		self.focus.foreground(&engine);
		self.current_tx.send_replace(Some(CurrentSession { id: id.clone(), engine }));

		debug!(target = "tabshell.session", session = %id, incognito, "session created");
		Ok(id)
	}

	/// Brings a known session to the foreground, materializing its engine
	/// lazily when no live handle is cached. Unknown ids are ignored.
	pub async fn open_session(&self, id: &SessionId) -> Result<()> {
		if self.registry.foreground_session_id().as_ref() == Some(id) {
			return Ok(());
		}

		let Some(descriptor) = self.registry.get_session(id).await? else {
			debug!(target = "tabshell.session", session = %id, "open for unknown session; ignoring");
			return Ok(());
		};

		let engine = match self.cache.get(id) {
			Some(engine) => engine,
			None => {
				let engine = self
					.factory
					.create(id, &descriptor.url, descriptor.incognito)
					.await
					.map_err(|source| ShellError::Factory { id: id.clone(), source })?;
				self.cache.insert(id.clone(), engine.clone());
				debug!(target = "tabshell.session", session = %id, "session materialized lazily");
				engine
			}
		};

		if let Some(previous) = self.current() {
			if &previous.id != id {
				self.focus.background(&previous.engine);
			}
		}

		self.focus.foreground(&engine);
		self.registry.set_foreground_session(Some(id.clone()));
		if descriptor.media_session {
			self.registry.set_media_session(id.clone());
		}
		self.current_tx.send_replace(Some(CurrentSession { id: id.clone(), engine }));
		Ok(())
	}

	/// Backgrounds the current session and clears the foreground slot,
	/// keeping the live handle cached for fast re-open.
	pub fn minimize_session(&self) {
		let Some(current) = self.current() else {
			return;
		};

		self.focus.background(&current.engine);
		self.registry.set_foreground_session(None);
		self.current_tx.send_replace(None);
		debug!(target = "tabshell.session", session = %current.id, "session minimized");
	}

	/// Closes a session: releases the engine, evicts the cached handle, and
	/// deletes the descriptor. Safe to call for ids without a live handle,
	/// and idempotent.
	pub async fn close_session(&self, id: &SessionId) -> Result<()> {
		if let Some(engine) = self.cache.remove(id) {
			self.focus.inactive(&engine);
			if let Err(err) = engine.destroy().await {
				warn!(target = "tabshell.session", session = %id, error = %err, "engine destroy failed");
			}
		} else {
			debug!(target = "tabshell.session", session = %id, "close without live handle; nothing to release");
		}

		if self.current().is_some_and(|current| &current.id == id) {
			self.current_tx.send_replace(None);
		}

		self.registry.remove_session(id).await
	}
}
