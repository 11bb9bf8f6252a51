use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    chatmodels::{Chat, Message},
    profilemodels::Profile,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuickFixDto {
    pub user_id: Uuid,
    pub worker_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatDto {
    pub quickfix_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantQuery {
    pub participant_id: Uuid,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    pub sender_id: Uuid,

    #[validate(length(min = 1, max = 5000, message = "Message must be between 1 and 5000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RespondToRequestDto {
    pub worker_id: Uuid,

    #[validate(length(min = 1))]
    pub response: String, // "accept" or "reject"
}

#[derive(Debug, Deserialize)]
pub struct ReadReceiptDto {
    pub reader_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ChatWithDetails {
    pub chat: Chat,
    pub other_participant: Option<Profile>,
    pub last_message: Option<Message>,
    pub unread_count: i64,
    pub last_activity: Option<String>,
}

/// A message annotated for display: whether a date divider belongs above it
/// and, if so, its label.
#[derive(Debug, Serialize)]
pub struct MessageListItem {
    #[serde(flatten)]
    pub message: Message,
    pub starts_new_day: bool,
    pub day_label: Option<String>,
}
