//! In-memory collaborator doubles.
//!
//! Shipped in the library rather than behind `cfg(test)` so integration
//! tests and downstream embedders can drive the coordination core without a
//! real engine, store, or presentation backend. All doubles record the calls
//! made against them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use tabshell_types::{MediaMetadata, PlaybackState, SessionId, SessionRecord, TabId};

use crate::engine::{EngineHandle, MediaHandle, MediaSession, SessionEngine, SessionFactory};
use crate::presentation::PresentationAdapter;
use crate::store::SessionStore;

/// Polls `condition` across task yields until it holds.
///
/// Listeners run as separate tasks on the same runtime; tests use this to
/// wait for event delivery without real sleeps.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	for _ in 0..500 {
		if condition() {
			return;
		}
		tokio::task::yield_now().await;
	}
	panic!("condition not reached after 500 yields");
}

/// Watch-backed in-memory session store.
pub struct MemorySessionStore {
	records: Mutex<HashMap<SessionId, SessionRecord>>,
	all_tx: watch::Sender<Vec<SessionRecord>>,
	fail_next_delete: AtomicBool,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		let (all_tx, _) = watch::channel(Vec::new());
		Self {
			records: Mutex::new(HashMap::new()),
			all_tx,
			fail_next_delete: AtomicBool::new(false),
		}
	}

	/// Makes the next `delete` call fail, for error-path tests.
	pub fn fail_next_delete(&self) {
		self.fail_next_delete.store(true, Ordering::SeqCst);
	}

	/// Raw record snapshot for assertions.
	pub fn record(&self, id: &SessionId) -> Option<SessionRecord> {
		self.records.lock().get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.records.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.lock().is_empty()
	}

	fn publish(&self) {
		let mut all: Vec<SessionRecord> = self.records.lock().values().cloned().collect();
		all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
		self.all_tx.send_replace(all);
	}
}

impl Default for MemorySessionStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SessionStore for MemorySessionStore {
	async fn upsert(&self, record: SessionRecord) -> anyhow::Result<()> {
		self.records.lock().insert(record.id.clone(), record);
		self.publish();
		Ok(())
	}

	async fn delete(&self, id: &SessionId) -> anyhow::Result<()> {
		if self.fail_next_delete.swap(false, Ordering::SeqCst) {
			anyhow::bail!("injected delete failure");
		}
		self.records.lock().remove(id);
		self.publish();
		Ok(())
	}

	async fn find_by_id(&self, id: &SessionId) -> anyhow::Result<Option<SessionRecord>> {
		Ok(self.records.lock().get(id).cloned())
	}

	fn watch_all(&self) -> watch::Receiver<Vec<SessionRecord>> {
		self.all_tx.subscribe()
	}
}

/// Call made against a [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
	LoadUrl(String),
	Reload,
	StopLoading,
	GoBack,
	GoForward,
	Destroy,
	SetActive(bool),
	SetFocused(bool),
}

/// Call-recording engine double with watch-backed reactive fields.
pub struct FakeEngine {
	calls: Mutex<Vec<EngineCall>>,
	active: AtomicBool,
	focused: AtomicBool,
	destroyed: AtomicBool,
	fail_focus_calls: AtomicBool,
	url_tx: watch::Sender<String>,
	title_tx: watch::Sender<String>,
	can_go_back_tx: watch::Sender<bool>,
	can_go_forward_tx: watch::Sender<bool>,
}

impl FakeEngine {
	pub fn new(url: &str) -> Arc<Self> {
		let (url_tx, _) = watch::channel(url.to_string());
		let (title_tx, _) = watch::channel(String::new());
		let (can_go_back_tx, _) = watch::channel(false);
		let (can_go_forward_tx, _) = watch::channel(false);
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			active: AtomicBool::new(false),
			focused: AtomicBool::new(false),
			destroyed: AtomicBool::new(false),
			fail_focus_calls: AtomicBool::new(false),
			url_tx,
			title_tx,
			can_go_back_tx,
			can_go_forward_tx,
		})
	}

	pub fn handle(self: &Arc<Self>) -> EngineHandle {
		EngineHandle::from_arc(Arc::clone(self) as Arc<dyn SessionEngine>)
	}

	pub fn calls(&self) -> Vec<EngineCall> {
		self.calls.lock().clone()
	}

	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::SeqCst)
	}

	pub fn is_focused(&self) -> bool {
		self.focused.load(Ordering::SeqCst)
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed.load(Ordering::SeqCst)
	}

	/// Makes `set_active`/`set_focused` fail, for boundary-error tests.
	pub fn fail_focus_calls(&self) {
		self.fail_focus_calls.store(true, Ordering::SeqCst);
	}

	/// Drives the reactive url/title fields, simulating navigation.
	pub fn set_page_info(&self, url: &str, title: &str) {
		self.url_tx.send_replace(url.to_string());
		self.title_tx.send_replace(title.to_string());
	}

	fn record(&self, call: EngineCall) {
		self.calls.lock().push(call);
	}
}

#[async_trait]
impl SessionEngine for FakeEngine {
	async fn load_url(&self, url: &str) -> anyhow::Result<()> {
		self.record(EngineCall::LoadUrl(url.to_string()));
		self.url_tx.send_replace(url.to_string());
		Ok(())
	}

	async fn reload(&self) -> anyhow::Result<()> {
		self.record(EngineCall::Reload);
		Ok(())
	}

	async fn stop_loading(&self) -> anyhow::Result<()> {
		self.record(EngineCall::StopLoading);
		Ok(())
	}

	async fn go_back(&self) -> anyhow::Result<bool> {
		self.record(EngineCall::GoBack);
		Ok(*self.can_go_back_tx.borrow())
	}

	async fn go_forward(&self) -> anyhow::Result<bool> {
		self.record(EngineCall::GoForward);
		Ok(*self.can_go_forward_tx.borrow())
	}

	async fn destroy(&self) -> anyhow::Result<()> {
		self.record(EngineCall::Destroy);
		self.destroyed.store(true, Ordering::SeqCst);
		Ok(())
	}

	fn set_active(&self, active: bool) -> anyhow::Result<()> {
		self.record(EngineCall::SetActive(active));
		if self.fail_focus_calls.load(Ordering::SeqCst) {
			anyhow::bail!("injected set_active failure");
		}
		self.active.store(active, Ordering::SeqCst);
		Ok(())
	}

	fn set_focused(&self, focused: bool) -> anyhow::Result<()> {
		self.record(EngineCall::SetFocused(focused));
		if self.fail_focus_calls.load(Ordering::SeqCst) {
			anyhow::bail!("injected set_focused failure");
		}
		self.focused.store(focused, Ordering::SeqCst);
		Ok(())
	}

	fn url(&self) -> watch::Receiver<String> {
		self.url_tx.subscribe()
	}

	fn title(&self) -> watch::Receiver<String> {
		self.title_tx.subscribe()
	}

	fn can_go_back(&self) -> watch::Receiver<bool> {
		self.can_go_back_tx.subscribe()
	}

	fn can_go_forward(&self) -> watch::Receiver<bool> {
		self.can_go_forward_tx.subscribe()
	}
}

/// Factory double that manufactures [`FakeEngine`]s and records requests.
#[derive(Default)]
pub struct FakeFactory {
	created: Mutex<Vec<SessionId>>,
	engines: Mutex<HashMap<SessionId, Arc<FakeEngine>>>,
	fail_next_create: AtomicBool,
}

impl FakeFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of `create` calls that succeeded.
	pub fn create_count(&self) -> usize {
		self.created.lock().len()
	}

	pub fn created_ids(&self) -> Vec<SessionId> {
		self.created.lock().clone()
	}

	/// Engine manufactured for `id`, if any.
	pub fn engine(&self, id: &SessionId) -> Option<Arc<FakeEngine>> {
		self.engines.lock().get(id).cloned()
	}

	/// Makes the next `create` call fail.
	pub fn fail_next_create(&self) {
		self.fail_next_create.store(true, Ordering::SeqCst);
	}
}

#[async_trait]
impl SessionFactory for FakeFactory {
	async fn create(&self, id: &SessionId, url: &str, _incognito: bool) -> anyhow::Result<EngineHandle> {
		if self.fail_next_create.swap(false, Ordering::SeqCst) {
			anyhow::bail!("injected factory failure");
		}
		let engine = FakeEngine::new(url);
		self.created.lock().push(id.clone());
		self.engines.lock().insert(id.clone(), Arc::clone(&engine));
		Ok(engine.handle())
	}
}

/// Call made against a [`FakeMediaSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCall {
	Play,
	Pause,
	Stop,
	NextTrack,
	PreviousTrack,
	Mute(bool),
}

/// Call-recording media session double.
pub struct FakeMediaSession {
	calls: Mutex<Vec<MediaCall>>,
	active: AtomicBool,
	fail_pause: AtomicBool,
}

impl FakeMediaSession {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			active: AtomicBool::new(true),
			fail_pause: AtomicBool::new(false),
		})
	}

	pub fn handle(self: &Arc<Self>) -> MediaHandle {
		MediaHandle::from_arc(Arc::clone(self) as Arc<dyn MediaSession>)
	}

	pub fn calls(&self) -> Vec<MediaCall> {
		self.calls.lock().clone()
	}

	/// Number of pause attempts, including failed ones.
	pub fn pause_count(&self) -> usize {
		self.calls.lock().iter().filter(|call| **call == MediaCall::Pause).count()
	}

	/// Makes every `pause` call fail, simulating a misbehaving tab.
	pub fn fail_pause(&self) {
		self.fail_pause.store(true, Ordering::SeqCst);
	}
}

#[async_trait]
impl MediaSession for FakeMediaSession {
	async fn play(&self) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::Play);
		Ok(())
	}

	async fn pause(&self) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::Pause);
		if self.fail_pause.load(Ordering::SeqCst) {
			anyhow::bail!("injected pause failure");
		}
		Ok(())
	}

	async fn stop(&self) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::Stop);
		Ok(())
	}

	async fn next_track(&self) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::NextTrack);
		Ok(())
	}

	async fn previous_track(&self) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::PreviousTrack);
		Ok(())
	}

	fn is_active(&self) -> bool {
		self.active.load(Ordering::SeqCst)
	}

	fn mute_audio(&self, mute: bool) -> anyhow::Result<()> {
		self.calls.lock().push(MediaCall::Mute(mute));
		Ok(())
	}
}

/// Call made against a [`RecordingPresentationAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationCall {
	Start { owner: TabId, state: PlaybackState },
	UpdateState(PlaybackState),
	UpdateMetadata(MediaMetadata),
	Stop,
}

/// Presentation adapter double recording the call sequence.
#[derive(Default)]
pub struct RecordingPresentationAdapter {
	calls: Mutex<Vec<PresentationCall>>,
}

impl RecordingPresentationAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> Vec<PresentationCall> {
		self.calls.lock().clone()
	}

	pub fn start_count(&self) -> usize {
		self.calls
			.lock()
			.iter()
			.filter(|call| matches!(call, PresentationCall::Start { .. }))
			.count()
	}

	pub fn stop_count(&self) -> usize {
		self.calls.lock().iter().filter(|call| **call == PresentationCall::Stop).count()
	}
}

#[async_trait]
impl PresentationAdapter for RecordingPresentationAdapter {
	async fn start(&self, owner: &TabId, _handle: MediaHandle, initial_state: PlaybackState) -> anyhow::Result<()> {
		self.calls.lock().push(PresentationCall::Start {
			owner: owner.clone(),
			state: initial_state,
		});
		Ok(())
	}

	async fn update_state(&self, state: PlaybackState) -> anyhow::Result<()> {
		self.calls.lock().push(PresentationCall::UpdateState(state));
		Ok(())
	}

	async fn update_metadata(&self, metadata: &MediaMetadata) -> anyhow::Result<()> {
		self.calls.lock().push(PresentationCall::UpdateMetadata(metadata.clone()));
		Ok(())
	}

	async fn stop(&self) -> anyhow::Result<()> {
		self.calls.lock().push(PresentationCall::Stop);
		Ok(())
	}
}
