//! Broadcast bus of typed domain events.
//!
//! Explicitly constructed and passed by handle; there is no ambient global
//! bus. Delivery is best-effort per subscriber: publishing never blocks, and
//! a lagging receiver loses its oldest unread events instead of slowing
//! publishers down. Late subscribers see no replay.

use std::marker::PhantomData;

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::config::BusConfig;
use crate::events::Event;

/// Cloneable handle to a shared event bus.
#[derive(Clone)]
pub struct EventBus {
	tx: broadcast::Sender<Event>,
}

impl EventBus {
	pub fn new(config: BusConfig) -> Self {
		let (tx, _) = broadcast::channel(config.capacity.max(1));
		Self { tx }
	}

	/// Publishes an event to all live subscribers.
	///
	/// Never blocks and never fails; an event with no subscribers is simply
	/// dropped.
	pub fn publish(&self, event: impl Into<Event>) {
		let event = event.into();
		trace!(target = "tabshell.bus", event = event.name(), "publish");
		let _ = self.tx.send(event);
	}

	/// Subscribes to all events published from this point on.
	pub fn subscribe(&self) -> EventStream {
		EventStream {
			rx: self.tx.subscribe(),
		}
	}

	/// Subscribes to events of exactly type `E`.
	pub fn subscribe_to<E>(&self) -> TypedEventStream<E>
	where
		E: TryFrom<Event, Error = Event>,
	{
		TypedEventStream {
			inner: self.subscribe(),
			_marker: PhantomData,
		}
	}

	/// Number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.tx.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(BusConfig::default())
	}
}

/// Lazy cursor over bus events, active until dropped.
pub struct EventStream {
	rx: broadcast::Receiver<Event>,
}

impl EventStream {
	/// Receives the next event, skipping over any gap created by lag.
	/// Returns `None` once the bus has been dropped.
	pub async fn next(&mut self) -> Option<Event> {
		loop {
			match self.rx.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(dropped)) => {
					debug!(target = "tabshell.bus", dropped, "subscriber lagged; oldest unread events dropped");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}
}

/// [`EventStream`] filtered down to one payload type.
pub struct TypedEventStream<E> {
	inner: EventStream,
	_marker: PhantomData<E>,
}

impl<E> TypedEventStream<E>
where
	E: TryFrom<Event, Error = Event>,
{
	/// Receives the next event of type `E`, discarding others.
	pub async fn next(&mut self) -> Option<E> {
		while let Some(event) = self.inner.next().await {
			if let Ok(payload) = E::try_from(event) {
				return Some(payload);
			}
		}
		None
	}
}
