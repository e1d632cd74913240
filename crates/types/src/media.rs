//! Media playback state and metadata types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Playback state reported by a tab's media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
	Play,
	Pause,
	Stop,
}

impl fmt::Display for PlaybackState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PlaybackState::Play => write!(f, "play"),
			PlaybackState::Pause => write!(f, "pause"),
			PlaybackState::Stop => write!(f, "stop"),
		}
	}
}

/// Track metadata reported alongside playback, shown by the presentation
/// layer while the background service runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
	pub title: Option<String>,
	pub artist: Option<String>,
	pub album: Option<String>,
	pub artwork: Option<Artwork>,
}

/// Opaque artwork payload carried inside media events.
///
/// Refcounted so metadata can be fanned out to multiple subscribers without
/// copying image bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork(Arc<[u8]>);

impl Artwork {
	pub fn new(bytes: Vec<u8>) -> Self {
		Self(bytes.into())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Debug for Artwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Artwork").field("len", &self.0.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn playback_state_serializes_lowercase() {
		assert_eq!(serde_json::to_string(&PlaybackState::Play).unwrap(), "\"play\"");
		assert_eq!(serde_json::to_string(&PlaybackState::Stop).unwrap(), "\"stop\"");
	}

	#[test]
	fn artwork_compares_by_bytes() {
		let a = Artwork::new(vec![1, 2, 3]);
		let b = Artwork::new(vec![1, 2, 3]);
		let c = Artwork::new(vec![9]);
		assert_eq!(a, b);
		assert_ne!(a, c);
	}
}
