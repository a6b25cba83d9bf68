//! Wire types and backend contract for the oceanchat client.
//!
//! The synchronization core in `oceanchat-core` talks to the service only
//! through the [`ChatBackend`] trait defined here; [`HttpBackend`] is the
//! reqwest implementation of that contract.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatBackend, HttpBackend, RequestPolicy, DEFAULT_REQUEST_TIMEOUT};
pub use error::ApiError;
pub use types::{
    Attachment, Message, MessageHistory, MessageRole, ModelCatalog, ModelEntry, SendReply,
    SendRequest, Session, SessionList, UploadKind, UploadReceipt,
};
