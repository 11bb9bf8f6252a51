use thiserror::Error;
use uuid::Uuid;

use crate::{error::HttpError, models::chatmodels::ChatStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Worker profile not found for {0}")]
    WorkerProfileNotFound(Uuid),

    #[error("QuickFix {0} not found")]
    QuickFixNotFound(Uuid),

    #[error("Chat {0} not found")]
    ChatNotFound(Uuid),

    #[error("Action not allowed while chat {0} is in status {1:?}")]
    ActionNotAllowed(Uuid, ChatStatus),

    #[error("User {0} is not a participant of chat {1}")]
    NotAParticipant(Uuid, Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Transient storage failures the caller may retry. Everything else is a
    /// caller error and retrying it verbatim will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::Database(_) | ServiceError::Persistence(_)
        )
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::WorkerProfileNotFound(_)
            | ServiceError::QuickFixNotFound(_)
            | ServiceError::ChatNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::ActionNotAllowed(_, _) => HttpError::conflict(error.to_string()),

            ServiceError::NotAParticipant(_, _) => HttpError::unauthorized(error.to_string()),

            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
