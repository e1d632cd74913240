//! Tuning knobs for the event bus and media coordinator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Buffered events retained per bus subscriber before oldest-unread drop.
pub const DEFAULT_BUS_CAPACITY: usize = 64;
/// Default delay before a media deactivation actually stops the service.
pub const DEFAULT_STOP_DEBOUNCE_MS: u64 = 300;

fn default_bus_capacity() -> usize {
	DEFAULT_BUS_CAPACITY
}

fn default_stop_debounce_ms() -> u64 {
	DEFAULT_STOP_DEBOUNCE_MS
}

/// Event bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
	/// Per-subscriber buffer capacity. A subscriber falling further behind
	/// than this loses its oldest unread events.
	#[serde(default = "default_bus_capacity")]
	pub capacity: usize,
}

impl Default for BusConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_BUS_CAPACITY,
		}
	}
}

/// Media playback coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
	/// Milliseconds a media deactivation is held before the presentation
	/// service is stopped. Absorbs rapid tab-switch deactivate/activate
	/// churn.
	#[serde(default = "default_stop_debounce_ms")]
	pub stop_debounce_ms: u64,
}

impl CoordinatorConfig {
	/// Debounce delay as a [`Duration`].
	pub fn stop_debounce(&self) -> Duration {
		Duration::from_millis(self.stop_debounce_ms)
	}
}

impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self {
			stop_debounce_ms: DEFAULT_STOP_DEBOUNCE_MS,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_constants() {
		assert_eq!(BusConfig::default().capacity, DEFAULT_BUS_CAPACITY);
		assert_eq!(CoordinatorConfig::default().stop_debounce(), Duration::from_millis(DEFAULT_STOP_DEBOUNCE_MS));
	}
}
