//! Session lifecycle subsystem.
//!
//! This module centralizes the persisted session registry, the runtime cache
//! of live engine handles, focus-transition policy, and the manager that
//! orchestrates create/open/minimize/close.

/// Live engine handles for materialized sessions.
pub mod cache;
/// Focus transitions applied to live engine handles.
pub mod focus;
/// Bus listener persisting tab lifecycle events.
pub mod listener;
/// Session orchestration: create, open, minimize, close.
pub mod manager;
/// Persisted session list plus runtime foreground/media pointers.
pub mod registry;

pub use cache::SessionRuntimeCache;
pub use focus::FocusController;
pub use listener::SessionEventListener;
pub use manager::{CurrentSession, SessionManager};
pub use registry::SessionRegistry;
