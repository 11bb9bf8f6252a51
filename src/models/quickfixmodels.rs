// models/quickfixmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booking request linking a user to a worker. Each chat negotiates
/// exactly one of these.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct QuickFix {
    pub id: Uuid,
    pub user_id: Uuid,
    pub worker_id: Uuid,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
}
