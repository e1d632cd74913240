//! Typed domain events broadcast on the event bus.
//!
//! Each event is its own payload struct so listeners can subscribe to one
//! type via [`EventBus::subscribe_to`](crate::bus::EventBus::subscribe_to);
//! [`Event`] is the wire enum the bus actually carries.

use tabshell_types::{MediaMetadata, PlaybackState, TabId};

use crate::engine::MediaHandle;

/// A tab was created by the engine (e.g. `window.open`).
#[derive(Debug, Clone)]
pub struct TabCreated {
	pub tab_id: TabId,
	pub url: String,
}

/// A tab was closed by the engine.
#[derive(Debug, Clone)]
pub struct TabClosed {
	pub tab_id: TabId,
}

/// A tab's url or title changed.
#[derive(Debug, Clone)]
pub struct TabInfoChanged {
	pub tab_id: TabId,
	pub url: String,
	pub title: String,
}

/// A tab's media session became active. Carries the handle so the winning
/// consumer can drive it directly; no side-channel registry exists.
#[derive(Debug, Clone)]
pub struct MediaActivated {
	pub tab_id: TabId,
	pub handle: MediaHandle,
}

/// A tab reported new track metadata.
#[derive(Debug, Clone)]
pub struct MediaMetadataChanged {
	pub tab_id: TabId,
	pub handle: MediaHandle,
	pub metadata: MediaMetadata,
}

/// A tab's playback state changed.
#[derive(Debug, Clone)]
pub struct MediaStateChanged {
	pub tab_id: TabId,
	pub handle: MediaHandle,
	pub state: PlaybackState,
}

/// A tab's media session went away.
#[derive(Debug, Clone)]
pub struct MediaDeactivated {
	pub tab_id: TabId,
}

/// Union of all domain events carried by the bus.
#[derive(Debug, Clone)]
pub enum Event {
	TabCreated(TabCreated),
	TabClosed(TabClosed),
	TabInfoChanged(TabInfoChanged),
	MediaActivated(MediaActivated),
	MediaMetadataChanged(MediaMetadataChanged),
	MediaStateChanged(MediaStateChanged),
	MediaDeactivated(MediaDeactivated),
}

impl Event {
	/// Stable event name for logging.
	pub fn name(&self) -> &'static str {
		match self {
			Event::TabCreated(_) => "tab_created",
			Event::TabClosed(_) => "tab_closed",
			Event::TabInfoChanged(_) => "tab_info_changed",
			Event::MediaActivated(_) => "media_activated",
			Event::MediaMetadataChanged(_) => "media_metadata_changed",
			Event::MediaStateChanged(_) => "media_state_changed",
			Event::MediaDeactivated(_) => "media_deactivated",
		}
	}
}

macro_rules! event_payload {
	($($variant:ident),+ $(,)?) => {
		$(
			impl From<$variant> for Event {
				fn from(payload: $variant) -> Self {
					Event::$variant(payload)
				}
			}

			impl TryFrom<Event> for $variant {
				type Error = Event;

				fn try_from(event: Event) -> std::result::Result<Self, Event> {
					match event {
						Event::$variant(payload) => Ok(payload),
						other => Err(other),
					}
				}
			}
		)+
	};
}

event_payload!(
	TabCreated,
	TabClosed,
	TabInfoChanged,
	MediaActivated,
	MediaMetadataChanged,
	MediaStateChanged,
	MediaDeactivated,
);
