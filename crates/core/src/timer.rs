//! Cancellable delayed task, used for debounced service shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;

/// Runs an action after a delay unless cancelled first.
///
/// Cancellation is idempotent: cancelling twice, or cancelling after the
/// timer already fired, is a no-op. Dropping the handle cancels a pending
/// timer; re-arming is expressed by cancelling and scheduling a fresh task.
pub struct DelayedTask {
	cancel: Option<oneshot::Sender<()>>,
}

impl DelayedTask {
	/// Schedules `action` to run after `delay`.
	pub fn schedule<F>(delay: Duration, action: F) -> Self
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
		tokio::spawn(async move {
			tokio::select! {
				_ = tokio::time::sleep(delay) => action.await,
				_ = &mut cancel_rx => {}
			}
		});
		Self { cancel: Some(cancel_tx) }
	}

	/// Cancels the pending action.
	pub fn cancel(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			let _ = cancel.send(());
		}
	}

	/// Returns `true` while the timer is armed and has neither fired nor
	/// been cancelled.
	pub fn is_armed(&self) -> bool {
		self.cancel.as_ref().is_some_and(|cancel| !cancel.is_closed())
	}
}

impl Drop for DelayedTask {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn fires_after_the_delay() {
		let fired = Arc::new(AtomicUsize::new(0));
		let fired_clone = Arc::clone(&fired);
		let task = DelayedTask::schedule(Duration::from_millis(100), async move {
			fired_clone.fetch_add(1, Ordering::SeqCst);
		});

		// Let the spawned task arm its sleep before the clock moves.
		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(99)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);
		assert!(task.is_armed());

		tokio::time::advance(Duration::from_millis(2)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 1);
		assert!(!task.is_armed());
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_prevents_the_action_and_is_idempotent() {
		let fired = Arc::new(AtomicUsize::new(0));
		let fired_clone = Arc::clone(&fired);
		let mut task = DelayedTask::schedule(Duration::from_millis(100), async move {
			fired_clone.fetch_add(1, Ordering::SeqCst);
		});

		task.cancel();
		task.cancel();

		tokio::time::advance(Duration::from_millis(200)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn drop_cancels_a_pending_timer() {
		let fired = Arc::new(AtomicUsize::new(0));
		let fired_clone = Arc::clone(&fired);
		drop(DelayedTask::schedule(Duration::from_millis(100), async move {
			fired_clone.fetch_add(1, Ordering::SeqCst);
		}));

		tokio::time::advance(Duration::from_millis(200)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_after_firing_is_a_no_op() {
		let fired = Arc::new(AtomicUsize::new(0));
		let fired_clone = Arc::clone(&fired);
		let mut task = DelayedTask::schedule(Duration::from_millis(10), async move {
			fired_clone.fetch_add(1, Ordering::SeqCst);
		});

		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(20)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 1);

		task.cancel();
		assert_eq!(fired.load(Ordering::SeqCst), 1);
	}
}
