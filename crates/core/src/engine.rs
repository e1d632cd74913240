//! Consumed capability surfaces of the rendering engine.
//!
//! The coordination core never talks to a real engine directly; it drives
//! these traits and leaves implementation to the embedding shell. Reactive
//! getters hand out watch receivers so callers observe navigation state
//! without polling.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use tabshell_types::SessionId;
use tokio::sync::watch;

/// Live rendering-engine instance bound to one session.
#[async_trait]
pub trait SessionEngine: Send + Sync {
	async fn load_url(&self, url: &str) -> anyhow::Result<()>;
	async fn reload(&self) -> anyhow::Result<()>;
	async fn stop_loading(&self) -> anyhow::Result<()>;
	/// Navigates back. Returns `false` when there is no history entry.
	async fn go_back(&self) -> anyhow::Result<bool>;
	/// Navigates forward. Returns `false` when there is no history entry.
	async fn go_forward(&self) -> anyhow::Result<bool>;
	/// Releases engine resources. The handle must not be driven afterwards.
	async fn destroy(&self) -> anyhow::Result<()>;
	/// Activates or deactivates the engine. An inactive engine stops
	/// running entirely.
	fn set_active(&self, active: bool) -> anyhow::Result<()>;
	/// Grants or revokes input focus. An active but unfocused engine keeps
	/// running (e.g. for audio) without receiving input.
	fn set_focused(&self, focused: bool) -> anyhow::Result<()>;
	fn url(&self) -> watch::Receiver<String>;
	fn title(&self) -> watch::Receiver<String>;
	fn can_go_back(&self) -> watch::Receiver<bool>;
	fn can_go_forward(&self) -> watch::Receiver<bool>;
}

/// Shared handle to a live [`SessionEngine`].
///
/// Logically owned by exactly one holder at a time (a runtime-cache entry or
/// the current session); clones exist only while ownership transfers.
#[derive(Clone)]
pub struct EngineHandle(Arc<dyn SessionEngine>);

impl EngineHandle {
	pub fn new(engine: impl SessionEngine + 'static) -> Self {
		Self(Arc::new(engine))
	}

	pub fn from_arc(engine: Arc<dyn SessionEngine>) -> Self {
		Self(engine)
	}
}

impl Deref for EngineHandle {
	type Target = dyn SessionEngine;

	fn deref(&self) -> &Self::Target {
		self.0.as_ref()
	}
}

impl fmt::Debug for EngineHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EngineHandle")
	}
}

/// Materializes live engines for known sessions.
///
/// Called when a session is created, and again lazily when a registered
/// session without a live handle is opened (e.g. after a process restart).
#[async_trait]
pub trait SessionFactory: Send + Sync {
	async fn create(&self, id: &SessionId, url: &str, incognito: bool) -> anyhow::Result<EngineHandle>;
}

/// Media-session capability surface of one tab.
#[async_trait]
pub trait MediaSession: Send + Sync {
	async fn play(&self) -> anyhow::Result<()>;
	async fn pause(&self) -> anyhow::Result<()>;
	async fn stop(&self) -> anyhow::Result<()>;
	async fn next_track(&self) -> anyhow::Result<()>;
	async fn previous_track(&self) -> anyhow::Result<()>;
	fn is_active(&self) -> bool;
	fn mute_audio(&self, mute: bool) -> anyhow::Result<()>;
}

/// Shared handle to a tab's [`MediaSession`].
///
/// Travels inside media events so the consumer that wins ownership (media
/// registry entry or active service owner) can drive it directly.
#[derive(Clone)]
pub struct MediaHandle(Arc<dyn MediaSession>);

impl MediaHandle {
	pub fn new(session: impl MediaSession + 'static) -> Self {
		Self(Arc::new(session))
	}

	pub fn from_arc(session: Arc<dyn MediaSession>) -> Self {
		Self(session)
	}
}

impl Deref for MediaHandle {
	type Target = dyn MediaSession;

	fn deref(&self) -> &Self::Target {
		self.0.as_ref()
	}
}

impl fmt::Debug for MediaHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("MediaHandle")
	}
}
