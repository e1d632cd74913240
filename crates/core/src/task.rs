//! Cancellation guard for spawned listener tasks.

use std::fmt;

use tokio::sync::oneshot;

/// RAII cancellation handle for a background task.
///
/// Cancels the task on drop; [`cancel`](TaskGuard::cancel) is idempotent, so
/// cancelling twice or cancelling after the task already exited is a no-op.
pub struct TaskGuard {
	cancel: Option<oneshot::Sender<()>>,
}

impl TaskGuard {
	pub(crate) fn new(cancel: oneshot::Sender<()>) -> Self {
		Self { cancel: Some(cancel) }
	}

	/// Signals the task to stop.
	pub fn cancel(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			let _ = cancel.send(());
		}
	}

	/// Returns `true` while the task is still running and cancellable.
	pub fn is_active(&self) -> bool {
		self.cancel.as_ref().is_some_and(|cancel| !cancel.is_closed())
	}
}

impl Drop for TaskGuard {
	fn drop(&mut self) {
		self.cancel();
	}
}

impl fmt::Debug for TaskGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TaskGuard").field("active", &self.is_active()).finish()
	}
}
