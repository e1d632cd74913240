//! Media listener tests: single-playback policy over bus-delivered events.

use std::sync::Arc;

use tabshell::events::{MediaActivated, MediaDeactivated, MediaMetadataChanged, MediaStateChanged};
use tabshell::testing::{FakeMediaSession, wait_until};
use tabshell::{EventBus, MediaEventListener, MediaMetadata, MediaStateRegistry, PlaybackState, TabId};

struct Fixture {
	bus: EventBus,
	registry: Arc<MediaStateRegistry>,
	_listener: MediaEventListener,
}

fn fixture() -> Fixture {
	let bus = EventBus::default();
	let registry = Arc::new(MediaStateRegistry::new());
	let listener = MediaEventListener::spawn(&bus, Arc::clone(&registry));
	Fixture {
		bus,
		registry,
		_listener: listener,
	}
}

fn tab(id: &str) -> TabId {
	TabId::from(id)
}

impl Fixture {
	fn activate(&self, id: &str, session: &Arc<FakeMediaSession>) {
		self.bus.publish(MediaActivated {
			tab_id: tab(id),
			handle: session.handle(),
		});
	}

	fn state(&self, id: &str, session: &Arc<FakeMediaSession>, state: PlaybackState) {
		self.bus.publish(MediaStateChanged {
			tab_id: tab(id),
			handle: session.handle(),
			state,
		});
	}
}

/// At most one registered tab reports `Play`, and it matches the marker.
fn assert_single_playback(registry: &MediaStateRegistry) {
	let playing: Vec<TabId> = registry
		.all_tabs_with_media()
		.into_iter()
		.filter(|entry| entry.playback_state == PlaybackState::Play)
		.map(|entry| entry.tab_id)
		.collect();
	assert!(playing.len() <= 1, "more than one playing tab: {playing:?}");
	assert_eq!(registry.currently_playing().map(|entry| entry.tab_id), playing.first().cloned());
}

#[tokio::test]
async fn activation_registers_the_tab_paused() {
	let fx = fixture();
	let session = FakeMediaSession::new();

	fx.activate("a", &session);

	wait_until(|| fx.registry.has_media(&tab("a"))).await;
	assert_eq!(fx.registry.get_state(&tab("a")).unwrap().playback_state, PlaybackState::Pause);
	assert!(fx.registry.currently_playing().is_none());
}

#[tokio::test]
async fn new_playback_pauses_the_previous_tab_exactly_once() {
	let fx = fixture();
	let session_a = FakeMediaSession::new();
	let session_b = FakeMediaSession::new();

	fx.activate("a", &session_a);
	fx.activate("b", &session_b);
	fx.state("a", &session_a, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("a"))).await;

	fx.state("b", &session_b, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("b"))).await;

	assert_eq!(session_a.pause_count(), 1, "displaced tab must be paused exactly once");
	assert_eq!(session_b.pause_count(), 0);
	assert_eq!(fx.registry.get_state(&tab("a")).unwrap().playback_state, PlaybackState::Pause);
	assert_single_playback(&fx.registry);
}

#[tokio::test]
async fn a_misbehaving_tab_cannot_block_new_playback() {
	let fx = fixture();
	let session_a = FakeMediaSession::new();
	let session_b = FakeMediaSession::new();
	session_a.fail_pause();

	fx.activate("a", &session_a);
	fx.activate("b", &session_b);
	fx.state("a", &session_a, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("a"))).await;

	fx.state("b", &session_b, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("b"))).await;

	assert_eq!(session_a.pause_count(), 1);
	assert_single_playback(&fx.registry);
}

#[tokio::test]
async fn replaying_the_same_tab_does_not_pause_it() {
	let fx = fixture();
	let session = FakeMediaSession::new();

	fx.activate("a", &session);
	fx.state("a", &session, PlaybackState::Play);
	fx.state("a", &session, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("a"))).await;

	assert_eq!(session.pause_count(), 0);
}

#[tokio::test]
async fn deactivation_unregisters_and_stale_events_are_ignored() {
	let fx = fixture();
	let session = FakeMediaSession::new();

	fx.activate("a", &session);
	fx.state("a", &session, PlaybackState::Play);
	wait_until(|| fx.registry.is_playing(&tab("a"))).await;

	fx.bus.publish(MediaDeactivated { tab_id: tab("a") });
	wait_until(|| !fx.registry.has_media(&tab("a"))).await;
	assert!(fx.registry.currently_playing().is_none());

	// Late events for the departed tab change nothing.
	fx.state("a", &session, PlaybackState::Play);
	fx.bus.publish(MediaDeactivated { tab_id: tab("a") });
	let observer = FakeMediaSession::new();
	fx.activate("b", &observer);
	wait_until(|| fx.registry.has_media(&tab("b"))).await;
	assert!(!fx.registry.has_media(&tab("a")));
	assert!(fx.registry.currently_playing().is_none());
}

#[tokio::test]
async fn metadata_updates_attach_to_the_tab() {
	let fx = fixture();
	let session = FakeMediaSession::new();
	let metadata = MediaMetadata {
		title: Some("Track".into()),
		artist: Some("Artist".into()),
		album: Some("Album".into()),
		artwork: None,
	};

	fx.activate("a", &session);
	fx.bus.publish(MediaMetadataChanged {
		tab_id: tab("a"),
		handle: session.handle(),
		metadata: metadata.clone(),
	});

	wait_until(|| fx.registry.get_state(&tab("a")).is_some_and(|entry| entry.metadata.is_some())).await;
	assert_eq!(fx.registry.get_state(&tab("a")).unwrap().metadata, Some(metadata));
}

#[tokio::test]
async fn invariant_holds_over_interleaved_event_scripts() {
	let fx = fixture();
	let sessions: Vec<(&str, Arc<FakeMediaSession>)> =
		["a", "b", "c"].into_iter().map(|id| (id, FakeMediaSession::new())).collect();

	for (id, session) in &sessions {
		fx.activate(id, session);
	}
	let script = [
		("a", PlaybackState::Play),
		("b", PlaybackState::Play),
		("c", PlaybackState::Play),
		("b", PlaybackState::Play),
		("b", PlaybackState::Pause),
		("a", PlaybackState::Play),
	];
	for (id, state) in script {
		let session = &sessions.iter().find(|(sid, _)| *sid == id).unwrap().1;
		fx.state(id, session, state);
	}

	wait_until(|| fx.registry.is_playing(&tab("a"))).await;
	assert_single_playback(&fx.registry);
	assert_eq!(fx.registry.all_tabs_with_media().len(), 3);
}
