//! Client-side synchronization core for the oceanchat service.
//!
//! Local state lives in three stores (model registry, session store,
//! message timeline) owned by a [`ChatClient`] that keeps them in step with
//! the backend: bootstrap population, wholesale history reloads on session
//! switch, and an optimistic send pipeline that appends the user's message
//! immediately and reconciles with the authoritative reply (or presents the
//! failure in-timeline) when the request resolves.

pub mod client;
pub mod registry;
pub mod sessions;
pub mod timeline;

pub use client::{ChatClient, ClientState, Draft, SendError, SendOutcome};
pub use registry::ModelRegistry;
pub use sessions::{SessionStore, DEFAULT_SESSION_TITLE};
pub use timeline::MessageTimeline;
