use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use oceanchat_api::{ApiError, ChatBackend, SendRequest, UploadKind};

use crate::registry::ModelRegistry;
use crate::sessions::SessionStore;
use crate::timeline::MessageTimeline;

/// Titles derived from message content are cut to this many characters.
const TITLE_HINT_MAX_CHARS: usize = 30;

/// A send request as the input surface hands it over: body text, optional
/// system prompt, and the upload ids staged for this message.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub message: String,
    pub system_prompt: Option<String>,
    pub attachments: Vec<String>,
}

impl Draft {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Admission rejections. Anything past admission resolves through the
/// timeline instead (see [`SendOutcome`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("a send is already in flight")]
    Busy,

    #[error("message is empty")]
    Empty,
}

/// Terminal state of one send. A `Failed` send has already presented itself
/// as a synthetic timeline entry; the value is informational.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Delivered { session_id: String },
    Failed { error: ApiError },
}

/// Everything the client mutates, behind one lock. Lock scopes are short
/// and never cross an await, so session switching, model selection and new
/// sessions all stay usable while a send is in flight.
#[derive(Debug, Default)]
pub struct ClientState {
    pub registry: ModelRegistry,
    pub sessions: SessionStore,
    pub timeline: MessageTimeline,
    pub loading: bool,
    abort: CancellationToken,
}

/// The synchronization core: local state for sessions, history and model
/// selection, kept in step with the backend through optimistic sends.
#[derive(Clone)]
pub struct ChatClient {
    state: Arc<RwLock<ClientState>>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ClientState::default())),
            backend,
        }
    }

    /// Read access to the stores, for rendering and assertions.
    pub async fn state(&self) -> RwLockReadGuard<'_, ClientState> {
        self.state.read().await
    }

    /// Startup population of the model registry and the session list. Both
    /// fetches degrade silently: a failed catalog marks the registry
    /// unhealthy, a failed listing leaves the store empty.
    pub async fn bootstrap(&self) {
        let catalog = self.backend.list_models().await;
        let listing = self.backend.list_sessions().await;

        let mut state = self.state.write().await;
        match catalog {
            Ok(catalog) => state.registry.apply_catalog(catalog),
            Err(error) => {
                warn!(%error, "model catalog fetch failed");
                state.registry.mark_unavailable();
            }
        }
        match listing {
            Ok(listing) => state.sessions.replace_all(listing.sessions),
            Err(error) => warn!(%error, "session list fetch failed"),
        }
    }

    /// Make `session_id` current and reload its history. A failed reload
    /// leaves an empty timeline, not an error state.
    pub async fn select_session(&self, session_id: &str) {
        {
            let mut state = self.state.write().await;
            state.sessions.set_current(session_id);
        }

        let history = self.backend.load_messages(session_id).await;

        let mut state = self.state.write().await;
        match history {
            Ok(history) => state.timeline.replace(history.messages),
            Err(error) => {
                warn!(%error, session_id, "message history fetch failed");
                state.timeline.clear();
            }
        }
    }

    /// Begin a new, unsaved session: no current id, empty timeline, no
    /// backend call. The server assigns an id on the first send.
    pub async fn start_new(&self) {
        let mut state = self.state.write().await;
        state.sessions.clear_current();
        state.timeline.clear();
    }

    pub async fn select_model(&self, name: &str) {
        let mut state = self.state.write().await;
        state.registry.select(name);
    }

    /// Abort the in-flight send, if any. The send resolves through its
    /// failure path, so `loading` is released normally.
    pub async fn cancel_inflight(&self) {
        let state = self.state.read().await;
        state.abort.cancel();
    }

    /// The optimistic send pipeline.
    ///
    /// Admission first: one send at a time (`loading` is the only guard),
    /// and the message must survive trimming. Then, in a single lock scope:
    /// capture the current session, model, timeline generation and title
    /// hint, and append the optimistic user entry. The backend call runs
    /// without any lock held. Completion re-locks once: a reply appends and
    /// reorders, a failure appends the synthetic error entry; either way
    /// `loading` drops. Completion effects on the timeline apply only when
    /// the captured generation still matches: a reply for a view the user
    /// has left is dropped here and recovered from server history on the
    /// next reload.
    pub async fn send(&self, draft: Draft) -> Result<SendOutcome, SendError> {
        let message = draft.message.trim().to_string();

        let (request, epoch, title_hint, had_session, abort) = {
            let mut state = self.state.write().await;
            if state.loading {
                return Err(SendError::Busy);
            }
            if message.is_empty() {
                return Err(SendError::Empty);
            }
            state.loading = true;
            state.abort = CancellationToken::new();

            // The hint reads the timeline before the optimistic append; an
            // existing conversation titles itself after its first message,
            // a fresh one after the message being sent.
            let title_hint = truncate_chars(
                state.timeline.first_content().unwrap_or(&message),
                TITLE_HINT_MAX_CHARS,
            );
            let session_id = state.sessions.current().map(str::to_string);
            let epoch = state.timeline.epoch();
            state.timeline.append_optimistic(&message);

            let request = SendRequest {
                session_id: session_id.clone(),
                message: message.clone(),
                model: state.registry.current_selection().map(str::to_string),
                attachments: draft.attachments,
                system_prompt: draft.system_prompt,
            };
            (request, epoch, title_hint, session_id.is_some(), state.abort.clone())
        };

        let result = tokio::select! {
            _ = abort.cancelled() => Err(ApiError::Cancelled),
            result = self.backend.send_message(&request) => result,
        };

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(reply) => {
                let view_intact = state.timeline.epoch() == epoch;
                if !had_session && view_intact {
                    state.sessions.set_current(reply.session_id.as_str());
                }
                // Recency is global: the touched session reorders even when
                // the user has navigated elsewhere meanwhile.
                state.sessions.upsert(&reply.session_id, &title_hint);
                if view_intact {
                    state.timeline.append_from_server(reply.message);
                } else {
                    debug!(
                        session_id = %reply.session_id,
                        "reply arrived after the view moved on; server history keeps it"
                    );
                }
                Ok(SendOutcome::Delivered {
                    session_id: reply.session_id,
                })
            }
            Err(error) => {
                if state.timeline.epoch() == epoch {
                    state.timeline.append_error(&format!("Error: {error}"));
                } else {
                    debug!(%error, "send failed after the view moved on");
                }
                Ok(SendOutcome::Failed { error })
            }
        }
    }

    /// Hand a file to the upload endpoint and return its attachment id.
    /// Failures propagate to the caller on their own channel, separate
    /// from in-timeline send failures.
    pub async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let receipt = self.backend.upload(kind, filename, bytes).await?;
        Ok(receipt.id)
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
