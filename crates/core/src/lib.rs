//! Session and media-playback coordination for a browser shell.
//!
//! This crate owns the interacting state machines behind a shell's tab
//! strip: the persisted session registry, the runtime cache of live engine
//! handles, the manager orchestrating create/open/minimize/close, the
//! per-tab media registry, and the coordinator driving the background media
//! presentation service. Two global invariants hold throughout: at most one
//! session is foreground, and at most one tab is playing.
//!
//! Everything outside those state machines is a consumed capability: the
//! rendering engine ([`SessionEngine`]), session persistence
//! ([`SessionStore`]), and the OS presentation layer
//! ([`PresentationAdapter`]) are traits the embedding shell implements.
//! Components communicate through an explicitly owned [`EventBus`];
//! listeners drain their own subscriptions as independent tasks and tolerate
//! out-of-order delivery by treating stale references as silent no-ops.

/// Broadcast bus of typed domain events.
pub mod bus;
/// Tuning knobs for the bus and media coordinator.
pub mod config;
/// Consumed engine, factory, and media-session capability surfaces.
pub mod engine;
/// Error taxonomy.
pub mod error;
/// Typed domain events.
pub mod events;
/// Media playback subsystem.
pub mod media;
/// Presentation adapter surface and user actions.
pub mod presentation;
/// Session lifecycle subsystem.
pub mod session;
/// Session store surface and record adapter.
pub mod store;
/// Cancellation guard for spawned tasks.
pub mod task;
/// In-memory collaborator doubles.
pub mod testing;
/// Cancellable delayed task.
pub mod timer;

pub use bus::{EventBus, EventStream, TypedEventStream};
pub use config::{BusConfig, CoordinatorConfig};
pub use engine::{EngineHandle, MediaHandle, MediaSession, SessionEngine, SessionFactory};
pub use error::{Result, ShellError};
pub use events::Event;
pub use media::{MediaEventListener, MediaPlaybackCoordinator, MediaStateRegistry, TabMediaState};
pub use presentation::{PresentationAdapter, UserAction};
pub use session::{CurrentSession, FocusController, SessionEventListener, SessionManager, SessionRegistry, SessionRuntimeCache};
pub use store::{SessionStore, StoreHandle};
pub use tabshell_types::{Artwork, MediaMetadata, PlaybackState, SessionDescriptor, SessionId, SessionRecord, TabId};
pub use task::TaskGuard;
pub use timer::DelayedTask;
