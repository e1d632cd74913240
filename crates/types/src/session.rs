//! Session identity and descriptor types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, globally unique session identity.
///
/// Generated once at session creation and immutable afterwards. Tabs and
/// sessions share one identity space, so [`TabId`] is an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

/// Identity of a tab as seen by media events. Same space as [`SessionId`].
pub type TabId = SessionId;

impl SessionId {
	/// Generates a fresh unique id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for SessionId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for SessionId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Domain view of one browsing session.
///
/// The persisted copy is the source of truth; in-memory views converge to it
/// through the store's change notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
	/// Immutable session identity.
	pub id: SessionId,
	/// Last known URL.
	pub url: String,
	/// Last known page title.
	pub title: String,
	/// Whether the session runs in incognito mode.
	pub incognito: bool,
	/// Whether this session is flagged as the shell's media session.
	pub media_session: bool,
}

/// Raw record shape exchanged with the session store.
///
/// Carries persistence bookkeeping (timestamps) the domain descriptor does
/// not; the store adapter translates between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
	/// Session identity.
	pub id: SessionId,
	/// Stored URL.
	pub url: String,
	/// Stored page title.
	pub title: String,
	/// Incognito flag.
	pub incognito: bool,
	/// Media-session flag.
	pub media_session: bool,
	/// Unix epoch seconds when the record was first written.
	pub created_at: u64,
	/// Unix epoch seconds of the last update.
	pub modified_at: u64,
}
