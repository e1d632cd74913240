//! Authoritative session registry.
//!
//! Wraps the external session store with the domain view: a reactive list of
//! known descriptors plus two runtime-only singleton pointers (foreground
//! session, media session). The persisted copy is the source of truth; the
//! reactive list converges to it whenever the store notifies, so additions
//! are eventually consistent with the in-memory view.

use tokio::sync::{oneshot, watch};
use tracing::debug;

use tabshell_types::{SessionDescriptor, SessionId};

use crate::error::{Result, ShellError};
use crate::store::{StoreHandle, descriptor_from_record, now_ts, record_from_descriptor};
use crate::task::TaskGuard;

pub struct SessionRegistry {
	store: StoreHandle,
	sessions_rx: watch::Receiver<Vec<SessionDescriptor>>,
	foreground_tx: watch::Sender<Option<SessionId>>,
	media_tx: watch::Sender<Option<SessionId>>,
	_bridge: TaskGuard,
}

impl SessionRegistry {
	/// Creates a registry over `store` and spawns the bridge task that
	/// re-derives the reactive descriptor list from store notifications.
	pub fn new(store: StoreHandle) -> Self {
		let mut records = store.watch_all();
		let initial: Vec<SessionDescriptor> = records.borrow().iter().map(descriptor_from_record).collect();
		let (sessions_tx, sessions_rx) = watch::channel(initial);
		let (foreground_tx, _) = watch::channel(None);
		let (media_tx, _) = watch::channel(None);

		let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
		tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = &mut cancel_rx => break,
					changed = records.changed() => {
						if changed.is_err() {
							break;
						}
						let descriptors: Vec<SessionDescriptor> = records.borrow_and_update().iter().map(descriptor_from_record).collect();
						sessions_tx.send_replace(descriptors);
					}
				}
			}
		});

		Self {
			store,
			sessions_rx,
			foreground_tx,
			media_tx,
			_bridge: TaskGuard::new(cancel_tx),
		}
	}

	/// Persists a descriptor (upsert, both timestamps set to now). The
	/// reactive list updates once the store notifies, not immediately.
	pub async fn add_session(&self, descriptor: &SessionDescriptor) -> Result<()> {
		let now = now_ts();
		self.store
			.upsert(record_from_descriptor(descriptor, now, now))
			.await
			.map_err(|source| ShellError::store("upsert", source))
	}

	/// Updates url/title for a known session, preserving its creation
	/// timestamp. Silently ignores unknown ids.
	pub async fn update_session_info(&self, id: &SessionId, url: &str, title: &str) -> Result<()> {
		let existing = self
			.store
			.find_by_id(id)
			.await
			.map_err(|source| ShellError::store("find_by_id", source))?;
		let Some(mut record) = existing else {
			debug!(target = "tabshell.session", session = %id, "info update for unknown session; ignoring");
			return Ok(());
		};

		record.url = url.to_string();
		record.title = title.to_string();
		record.modified_at = now_ts();
		self.store.upsert(record).await.map_err(|source| ShellError::store("upsert", source))
	}

	/// Removes a session.
	///
	/// Foreground/media pointers equal to `id` are cleared synchronously,
	/// before the delete suspends and independent of its outcome; the
	/// reactive list converges once the store notifies.
	pub async fn remove_session(&self, id: &SessionId) -> Result<()> {
		self.foreground_tx.send_if_modified(|current| {
			if current.as_ref() == Some(id) {
				*current = None;
				true
			} else {
				false
			}
		});
		self.media_tx.send_if_modified(|current| {
			if current.as_ref() == Some(id) {
				*current = None;
				true
			} else {
				false
			}
		});

		self.store.delete(id).await.map_err(|source| ShellError::store("delete", source))
	}

	/// Sets (or clears) the foreground pointer. Runtime-only, never
	/// persisted.
	pub fn set_foreground_session(&self, id: Option<SessionId>) {
		self.foreground_tx.send_replace(id);
	}

	/// Marks `id` as the shell's media session. Runtime-only.
	pub fn set_media_session(&self, id: SessionId) {
		self.media_tx.send_replace(Some(id));
	}

	/// Point lookup against the store, bypassing the cached reactive list.
	pub async fn get_session(&self, id: &SessionId) -> Result<Option<SessionDescriptor>> {
		let record = self
			.store
			.find_by_id(id)
			.await
			.map_err(|source| ShellError::store("find_by_id", source))?;
		Ok(record.as_ref().map(descriptor_from_record))
	}

	/// Reactive list of all known sessions.
	pub fn sessions(&self) -> watch::Receiver<Vec<SessionDescriptor>> {
		self.sessions_rx.clone()
	}

	pub fn foreground_session(&self) -> watch::Receiver<Option<SessionId>> {
		self.foreground_tx.subscribe()
	}

	pub fn media_session(&self) -> watch::Receiver<Option<SessionId>> {
		self.media_tx.subscribe()
	}

	/// Snapshot of the current foreground session id.
	pub fn foreground_session_id(&self) -> Option<SessionId> {
		self.foreground_tx.borrow().clone()
	}

	/// Snapshot of the current media session id.
	pub fn media_session_id(&self) -> Option<SessionId> {
		self.media_tx.borrow().clone()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::testing::{MemorySessionStore, wait_until};

	fn descriptor(id: &str, url: &str) -> SessionDescriptor {
		SessionDescriptor {
			id: SessionId::from(id),
			url: url.to_string(),
			title: String::new(),
			incognito: false,
			media_session: false,
		}
	}

	#[tokio::test]
	async fn added_sessions_appear_once_the_store_notifies() {
		let store = Arc::new(MemorySessionStore::new());
		let registry = SessionRegistry::new(store);

		registry.add_session(&descriptor("s1", "https://a.test")).await.unwrap();

		let sessions = registry.sessions();
		wait_until(|| sessions.borrow().len() == 1).await;
		assert_eq!(sessions.borrow()[0].id, SessionId::from("s1"));
	}

	#[tokio::test]
	async fn remove_clears_matching_pointers_even_when_the_delete_fails() {
		let store = Arc::new(MemorySessionStore::new());
		let registry = SessionRegistry::new(store.clone());

		let id = SessionId::from("s1");
		registry.add_session(&descriptor("s1", "https://a.test")).await.unwrap();
		registry.set_foreground_session(Some(id.clone()));
		registry.set_media_session(id.clone());

		store.fail_next_delete();
		let result = registry.remove_session(&id).await;
		assert!(result.is_err());

		// Pointers cleared regardless of the delete outcome; the descriptor
		// is still visible until a delete succeeds.
		assert_eq!(registry.foreground_session_id(), None);
		assert_eq!(registry.media_session_id(), None);
		assert!(registry.get_session(&id).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn remove_leaves_unrelated_pointers_alone() {
		let store = Arc::new(MemorySessionStore::new());
		let registry = SessionRegistry::new(store);

		let keep = SessionId::from("keep");
		registry.add_session(&descriptor("keep", "https://a.test")).await.unwrap();
		registry.add_session(&descriptor("gone", "https://b.test")).await.unwrap();
		registry.set_foreground_session(Some(keep.clone()));

		registry.remove_session(&SessionId::from("gone")).await.unwrap();
		assert_eq!(registry.foreground_session_id(), Some(keep));
	}

	#[tokio::test]
	async fn update_session_info_preserves_created_at() {
		let store = Arc::new(MemorySessionStore::new());
		let registry = SessionRegistry::new(store.clone());

		let id = SessionId::from("s1");
		registry.add_session(&descriptor("s1", "https://a.test")).await.unwrap();
		let created_at = store.record(&id).unwrap().created_at;

		registry.update_session_info(&id, "https://a.test/page", "Page").await.unwrap();

		let record = store.record(&id).unwrap();
		assert_eq!(record.created_at, created_at);
		assert_eq!(record.url, "https://a.test/page");
		assert_eq!(record.title, "Page");
	}

	#[tokio::test]
	async fn update_session_info_for_unknown_id_is_a_no_op() {
		let store = Arc::new(MemorySessionStore::new());
		let registry = SessionRegistry::new(store.clone());

		registry.update_session_info(&SessionId::from("ghost"), "https://x.test", "X").await.unwrap();
		assert!(store.is_empty());
	}
}
