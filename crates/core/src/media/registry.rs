//! Per-tab media state and the single-playback policy.

use std::collections::HashMap;

use parking_lot::Mutex;
use tabshell_types::{MediaMetadata, PlaybackState, TabId};

use crate::engine::MediaHandle;

/// Media state tracked for one tab.
#[derive(Debug, Clone)]
pub struct TabMediaState {
	pub tab_id: TabId,
	pub handle: MediaHandle,
	pub playback_state: PlaybackState,
	pub metadata: Option<MediaMetadata>,
}

#[derive(Default)]
struct Inner {
	tabs: HashMap<TabId, TabMediaState>,
	playing: Option<TabId>,
}

/// Registry of tabs with active media sessions.
///
/// Owns the single-playback invariant: at most one entry reports
/// [`PlaybackState::Play`], and that entry's id equals the currently-playing
/// marker. The registry only *decides* which tab must be paused when a new
/// one starts playing; actually calling `pause()` is the consumer's job, so
/// a misbehaving tab cannot corrupt registry state.
#[derive(Default)]
pub struct MediaStateRegistry {
	inner: Mutex<Inner>,
}

impl MediaStateRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or re-registers) a tab's media session, starting paused.
	/// Re-registering a tab that was playing clears the playing marker.
	pub fn register(&self, tab_id: TabId, handle: MediaHandle) {
		let mut inner = self.inner.lock();
		if inner.playing.as_ref() == Some(&tab_id) {
			inner.playing = None;
		}
		inner.tabs.insert(
			tab_id.clone(),
			TabMediaState {
				tab_id,
				handle,
				playback_state: PlaybackState::Pause,
				metadata: None,
			},
		);
	}

	/// Records a playback state change. Returns `false` for unregistered
	/// tabs.
	///
	/// A `Play` transition takes the currently-playing role from any
	/// previous holder, demoting its stored state to `Pause` without
	/// touching its media session; enforcement goes through
	/// [`tab_to_pause_for_new_playback`](Self::tab_to_pause_for_new_playback).
	pub fn update_state(&self, tab_id: &TabId, state: PlaybackState) -> bool {
		let mut inner = self.inner.lock();
		if !inner.tabs.contains_key(tab_id) {
			return false;
		}

		match state {
			PlaybackState::Play => {
				if let Some(previous) = inner.playing.take() {
					if previous != *tab_id {
						if let Some(entry) = inner.tabs.get_mut(&previous) {
							entry.playback_state = PlaybackState::Pause;
						}
					}
				}
				inner.playing = Some(tab_id.clone());
			}
			PlaybackState::Pause | PlaybackState::Stop => {
				if inner.playing.as_ref() == Some(tab_id) {
					inner.playing = None;
				}
			}
		}

		if let Some(entry) = inner.tabs.get_mut(tab_id) {
			entry.playback_state = state;
		}
		true
	}

	/// Records new track metadata. Returns `false` for unregistered tabs.
	pub fn update_metadata(&self, tab_id: &TabId, metadata: MediaMetadata) -> bool {
		let mut inner = self.inner.lock();
		match inner.tabs.get_mut(tab_id) {
			Some(entry) => {
				entry.metadata = Some(metadata);
				true
			}
			None => false,
		}
	}

	/// Removes a tab's media state, clearing the playing marker when it
	/// pointed at the removed tab. Returns `false` for unregistered tabs.
	pub fn unregister(&self, tab_id: &TabId) -> bool {
		let mut inner = self.inner.lock();
		if inner.playing.as_ref() == Some(tab_id) {
			inner.playing = None;
		}
		inner.tabs.remove(tab_id).is_some()
	}

	pub fn get_state(&self, tab_id: &TabId) -> Option<TabMediaState> {
		self.inner.lock().tabs.get(tab_id).cloned()
	}

	/// Whether `tab_id` is the tab playing right now.
	pub fn is_playing(&self, tab_id: &TabId) -> bool {
		self.inner.lock().playing.as_ref() == Some(tab_id)
	}

	pub fn has_media(&self, tab_id: &TabId) -> bool {
		self.inner.lock().tabs.contains_key(tab_id)
	}

	/// The tab playing right now, if any.
	pub fn currently_playing(&self) -> Option<TabMediaState> {
		let inner = self.inner.lock();
		inner.playing.as_ref().and_then(|playing| inner.tabs.get(playing)).cloned()
	}

	pub fn all_tabs_with_media(&self) -> Vec<TabMediaState> {
		self.inner.lock().tabs.values().cloned().collect()
	}

	pub fn clear(&self) {
		let mut inner = self.inner.lock();
		inner.tabs.clear();
		inner.playing = None;
	}

	/// Pause decision for single-playback enforcement: the previous playing
	/// tab's state iff it differs from `new_tab`.
	pub fn tab_to_pause_for_new_playback(&self, new_tab: &TabId) -> Option<TabMediaState> {
		let inner = self.inner.lock();
		inner
			.playing
			.as_ref()
			.filter(|playing| *playing != new_tab)
			.and_then(|playing| inner.tabs.get(playing))
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeMediaSession;

	fn tab(id: &str) -> TabId {
		TabId::from(id)
	}

	fn registry_with_tabs(ids: &[&str]) -> MediaStateRegistry {
		let registry = MediaStateRegistry::new();
		for id in ids {
			registry.register(tab(id), FakeMediaSession::new().handle());
		}
		registry
	}

	/// Invariant: at most one entry reports `Play`, and it matches the
	/// currently-playing marker.
	fn assert_single_playback(registry: &MediaStateRegistry) {
		let playing: Vec<TabId> = registry
			.all_tabs_with_media()
			.into_iter()
			.filter(|entry| entry.playback_state == PlaybackState::Play)
			.map(|entry| entry.tab_id)
			.collect();
		assert!(playing.len() <= 1, "more than one playing tab: {playing:?}");
		let marker = registry.currently_playing().map(|entry| entry.tab_id);
		match playing.first() {
			Some(id) => assert_eq!(marker.as_ref(), Some(id)),
			None => assert_eq!(marker, None),
		}
	}

	#[test]
	fn update_state_for_unregistered_tab_fails() {
		let registry = MediaStateRegistry::new();
		assert!(!registry.update_state(&tab("ghost"), PlaybackState::Play));
		assert!(!registry.update_metadata(&tab("ghost"), MediaMetadata::default()));
	}

	#[test]
	fn play_demotes_the_previous_holder_without_unregistering_it() {
		let registry = registry_with_tabs(&["a", "b"]);

		assert!(registry.update_state(&tab("a"), PlaybackState::Play));
		assert!(registry.is_playing(&tab("a")));

		assert!(registry.update_state(&tab("b"), PlaybackState::Play));
		assert!(registry.is_playing(&tab("b")));
		assert!(!registry.is_playing(&tab("a")));
		assert_eq!(registry.get_state(&tab("a")).unwrap().playback_state, PlaybackState::Pause);
		assert!(registry.has_media(&tab("a")));
		assert_single_playback(&registry);
	}

	#[test]
	fn pause_decision_skips_the_tab_that_is_taking_over() {
		let registry = registry_with_tabs(&["a", "b"]);
		registry.update_state(&tab("a"), PlaybackState::Play);

		// Same tab playing again: nothing to pause.
		assert!(registry.tab_to_pause_for_new_playback(&tab("a")).is_none());

		let displaced = registry.tab_to_pause_for_new_playback(&tab("b")).unwrap();
		assert_eq!(displaced.tab_id, tab("a"));
	}

	#[test]
	fn pausing_the_playing_tab_clears_the_marker() {
		let registry = registry_with_tabs(&["a"]);
		registry.update_state(&tab("a"), PlaybackState::Play);
		registry.update_state(&tab("a"), PlaybackState::Pause);

		assert!(registry.currently_playing().is_none());
		assert_single_playback(&registry);
	}

	#[test]
	fn unregister_clears_the_marker_for_the_playing_tab() {
		let registry = registry_with_tabs(&["a", "b"]);
		registry.update_state(&tab("a"), PlaybackState::Play);

		assert!(registry.unregister(&tab("a")));
		assert!(!registry.unregister(&tab("a")));
		assert!(registry.currently_playing().is_none());
		assert!(registry.has_media(&tab("b")));
	}

	#[test]
	fn reregistering_a_playing_tab_resets_it_to_paused() {
		let registry = registry_with_tabs(&["a"]);
		registry.update_state(&tab("a"), PlaybackState::Play);

		registry.register(tab("a"), FakeMediaSession::new().handle());
		assert_eq!(registry.get_state(&tab("a")).unwrap().playback_state, PlaybackState::Pause);
		assert!(registry.currently_playing().is_none());
		assert_single_playback(&registry);
	}

	#[test]
	fn invariant_holds_across_arbitrary_state_sequences() {
		let registry = registry_with_tabs(&["a", "b", "c"]);
		let script = [
			("a", PlaybackState::Play),
			("b", PlaybackState::Play),
			("b", PlaybackState::Pause),
			("c", PlaybackState::Play),
			("a", PlaybackState::Play),
			("c", PlaybackState::Stop),
			("a", PlaybackState::Stop),
		];

		for (id, state) in script {
			registry.update_state(&tab(id), state);
			assert_single_playback(&registry);
		}
	}

	#[test]
	fn metadata_updates_attach_to_the_entry() {
		let registry = registry_with_tabs(&["a"]);
		let metadata = MediaMetadata {
			title: Some("Track".into()),
			artist: Some("Artist".into()),
			..MediaMetadata::default()
		};

		assert!(registry.update_metadata(&tab("a"), metadata.clone()));
		assert_eq!(registry.get_state(&tab("a")).unwrap().metadata, Some(metadata));
	}

	#[test]
	fn clear_empties_everything() {
		let registry = registry_with_tabs(&["a", "b"]);
		registry.update_state(&tab("a"), PlaybackState::Play);

		registry.clear();
		assert!(registry.all_tabs_with_media().is_empty());
		assert!(registry.currently_playing().is_none());
	}
}
