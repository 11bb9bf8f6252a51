// models/chatmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "chat_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    WaitingForResponse,
    GettingSuggestions,
    Accepted,
    WorkerRefused,
}

impl ChatStatus {
    /// Once the worker refuses, nothing moves the chat again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatStatus::WorkerRefused)
    }

    pub fn allows_messaging(&self) -> bool {
        matches!(self, ChatStatus::GettingSuggestions | ChatStatus::Accepted)
    }
}

#[derive(Debug, Serialize, Clone, Deserialize, sqlx::FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub worker_id: Uuid,
    pub quickfix_id: Uuid,
    pub status: ChatStatus,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Chat {
    pub fn is_participant(&self, id: Uuid) -> bool {
        self.user_id == id || self.worker_id == id
    }

    pub fn other_participant(&self, id: Uuid) -> Uuid {
        if self.user_id == id {
            self.worker_id
        } else {
            self.user_id
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One record from a live chat feed. Every field is optional so a single bad
/// record can be dropped during merge instead of failing the whole snapshot.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessageSnapshot {
    pub id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub content: Option<String>,
    pub is_read: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}
