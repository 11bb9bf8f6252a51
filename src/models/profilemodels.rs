// models/profilemodels.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct WorkerProfile {
    pub id: Uuid,
    pub display_name: String,
    pub field_of_work: String,
    pub description: String,
    pub tags: Vec<String>,
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    pub unavailable_dates: Vec<NaiveDate>,
    pub rating: f64,
    pub hourly_rate: Option<f64>,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// The two profile variants as a tagged union. Call sites that need to tell
/// them apart (chat display, mostly) match exhaustively instead of downcasting.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    User(UserProfile),
    Worker(WorkerProfile),
}

impl Profile {
    pub fn id(&self) -> Uuid {
        match self {
            Profile::User(profile) => profile.id,
            Profile::Worker(profile) => profile.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Profile::User(profile) => &profile.display_name,
            Profile::Worker(profile) => &profile.display_name,
        }
    }
}
