use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Sessions
// ============================================================================

/// A server-tracked conversation with a title and recency timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            title: Some(title.into()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the recency timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Display metadata for a file referenced by a server message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// One entry of a conversation. `id` is server-assigned except for the two
/// locally generated kinds: `temp_` marks a user message awaiting
/// confirmation, `err_` marks a synthetic failure notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A user message inserted ahead of backend confirmation.
    pub fn user_local(content: impl Into<String>) -> Self {
        Self {
            id: format!("temp_{}", Uuid::new_v4().simple()),
            role: MessageRole::User,
            content: content.into(),
            attachments: Vec::new(),
            model: None,
            created_at: Utc::now(),
        }
    }

    /// A synthetic assistant message carrying a failure description.
    pub fn error_local(content: impl Into<String>) -> Self {
        Self {
            id: format!("err_{}", Uuid::new_v4().simple()),
            role: MessageRole::Assistant,
            content: content.into(),
            attachments: Vec::new(),
            model: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.id.starts_with("temp_")
    }
}

// ============================================================================
// Models
// ============================================================================

/// One selectable model as the backend advertises it. The `selected` flag is
/// only meaningful at catalog load time; the registry keeps the live
/// selection as a single nullable name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub provider: String,
    pub status: String,
    #[serde(default)]
    pub selected: bool,
}

impl ModelEntry {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

// ============================================================================
// Wire envelopes
// ============================================================================

/// Response of `GET /models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// Response of `GET /chat/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Response of `GET /chat/{session_id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHistory {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body of `POST /chat`. Nullable fields serialize as explicit nulls; the
/// backend treats a null `session_id` as "start a new session".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub session_id: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub attachments: Vec<String>,
    pub system_prompt: Option<String>,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReply {
    pub session_id: String,
    pub message: Message,
}

/// Response of the upload endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
}

/// Which upload endpoint an attachment goes through. The two differ only in
/// path and multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    File,
    Photo,
}

impl UploadKind {
    pub fn path(&self) -> &'static str {
        match self {
            UploadKind::File => "/uploads/file",
            UploadKind::Photo => "/uploads/photo",
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::File => "file",
            UploadKind::Photo => "photo",
        }
    }
}
