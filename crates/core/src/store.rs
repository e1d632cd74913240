//! Session store surface and the record↔descriptor adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tabshell_types::{SessionDescriptor, SessionId, SessionRecord};
use tokio::sync::watch;

/// External persistence for session records.
///
/// Implementations decide the storage medium; the core only requires upsert,
/// delete, point lookup, and a change-notified view of everything stored.
/// Deleting an unknown id is not an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn upsert(&self, record: SessionRecord) -> anyhow::Result<()>;
	async fn delete(&self, id: &SessionId) -> anyhow::Result<()>;
	async fn find_by_id(&self, id: &SessionId) -> anyhow::Result<Option<SessionRecord>>;
	/// Reactive view of all stored records; emits the full set on every
	/// change.
	fn watch_all(&self) -> watch::Receiver<Vec<SessionRecord>>;
}

/// Shared store handle.
pub type StoreHandle = Arc<dyn SessionStore>;

/// Translates a raw store record into the domain descriptor.
pub fn descriptor_from_record(record: &SessionRecord) -> SessionDescriptor {
	SessionDescriptor {
		id: record.id.clone(),
		url: record.url.clone(),
		title: record.title.clone(),
		incognito: record.incognito,
		media_session: record.media_session,
	}
}

/// Builds the store record for a descriptor with explicit timestamps.
pub fn record_from_descriptor(descriptor: &SessionDescriptor, created_at: u64, modified_at: u64) -> SessionRecord {
	SessionRecord {
		id: descriptor.id.clone(),
		url: descriptor.url.clone(),
		title: descriptor.title.clone(),
		incognito: descriptor.incognito,
		media_session: descriptor.media_session,
		created_at,
		modified_at,
	}
}

/// Current Unix timestamp in seconds.
pub fn now_ts() -> u64 {
	std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs()
}
