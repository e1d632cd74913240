//! Runtime cache of live engine handles.

use std::collections::HashMap;

use parking_lot::Mutex;
use tabshell_types::SessionId;

use crate::engine::EngineHandle;

/// Maps a session id to its live engine handle.
///
/// A session can be registered without being materialized (e.g. after a
/// process restart); only sessions currently holding engine resources appear
/// here. At most one live handle exists per id: inserting again replaces the
/// entry, and the caller owns teardown of the replaced handle.
#[derive(Default)]
pub struct SessionRuntimeCache {
	inner: Mutex<HashMap<SessionId, EngineHandle>>,
}

impl SessionRuntimeCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a live handle, returning the replaced one if present.
	pub fn insert(&self, id: SessionId, engine: EngineHandle) -> Option<EngineHandle> {
		self.inner.lock().insert(id, engine)
	}

	pub fn get(&self, id: &SessionId) -> Option<EngineHandle> {
		self.inner.lock().get(id).cloned()
	}

	/// Evicts a handle, transferring ownership to the caller.
	pub fn remove(&self, id: &SessionId) -> Option<EngineHandle> {
		self.inner.lock().remove(id)
	}

	pub fn contains(&self, id: &SessionId) -> bool {
		self.inner.lock().contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}

	pub fn clear(&self) {
		self.inner.lock().clear();
	}
}
