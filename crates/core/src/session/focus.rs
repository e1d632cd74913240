//! Focus transitions applied to live engine handles.

use tracing::warn;

use crate::engine::EngineHandle;

/// Translates focus transitions into engine activation calls.
///
/// Three transitions rather than a binary active flag: a backgrounded
/// session stays active so audio keeps playing, but loses input focus.
/// Engine failures are logged and swallowed here; focus bookkeeping must not
/// depend on a misbehaving engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct FocusController;

impl FocusController {
	/// Engine active and input-focused.
	pub fn foreground(&self, engine: &EngineHandle) {
		self.apply(engine, true, true, "foreground");
	}

	/// Engine active but not input-focused; the page keeps running.
	pub fn background(&self, engine: &EngineHandle) {
		self.apply(engine, true, false, "background");
	}

	/// Engine fully deactivated; used before teardown.
	pub fn inactive(&self, engine: &EngineHandle) {
		self.apply(engine, false, false, "inactive");
	}

	fn apply(&self, engine: &EngineHandle, active: bool, focused: bool, transition: &'static str) {
		if let Err(err) = engine.set_active(active) {
			warn!(target = "tabshell.session", transition, error = %err, "engine set_active failed");
		}
		if let Err(err) = engine.set_focused(focused) {
			warn!(target = "tabshell.session", transition, error = %err, "engine set_focused failed");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{EngineCall, FakeEngine};

	#[tokio::test]
	async fn transitions_map_to_active_and_focused_flags() {
		let engine = FakeEngine::new("https://example.com");
		let handle = engine.handle();
		let focus = FocusController;

		focus.foreground(&handle);
		assert!(engine.is_active() && engine.is_focused());

		focus.background(&handle);
		assert!(engine.is_active() && !engine.is_focused());

		focus.inactive(&handle);
		assert!(!engine.is_active() && !engine.is_focused());

		assert_eq!(
			engine.calls(),
			vec![
				EngineCall::SetActive(true),
				EngineCall::SetFocused(true),
				EngineCall::SetActive(true),
				EngineCall::SetFocused(false),
				EngineCall::SetActive(false),
				EngineCall::SetFocused(false),
			]
		);
	}

	#[tokio::test]
	async fn engine_failures_are_swallowed() {
		let engine = FakeEngine::new("https://example.com");
		engine.fail_focus_calls();
		let handle = engine.handle();

		// Must not panic or propagate.
		FocusController.foreground(&handle);
	}
}
