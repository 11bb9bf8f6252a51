use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{chatdb::ChatExt, profiledb::ProfileExt, quickfixdb::QuickFixExt},
    dtos::chatdtos::*,
    error::HttpError,
    models::chatmodels::Chat,
    service::chat_service::ChatAction,
    utils::timeline,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/quickfixes", post(create_quickfix))
        .route("/quickfixes/:quickfix_id", get(get_quickfix))
        .route("/chats", get(get_user_chats).post(create_chat))
        .route("/chats/:chat_id", get(get_chat_details))
        .route("/chats/:chat_id/messages", get(get_messages).post(send_message))
        .route("/chats/:chat_id/respond", put(respond_to_request))
        .route("/chats/:chat_id/suggestions", get(get_suggestions))
        .route("/chats/:chat_id/read", put(mark_chat_as_read))
        .route("/unread-count", get(get_unread_count))
}

pub async fn create_quickfix(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateQuickFixDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Verify the worker being booked exists
    let _ = app_state
        .db_client
        .get_worker_profile(body.worker_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Worker profile not found"))?;

    let quickfix = app_state
        .db_client
        .create_quickfix(body.user_id, body.worker_id, body.title)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": quickfix
    })))
}

pub async fn get_quickfix(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(quickfix_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let quickfix = app_state
        .db_client
        .get_quickfix_by_id(quickfix_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("QuickFix not found"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": quickfix
    })))
}

pub async fn create_chat(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateChatDto>,
) -> Result<impl IntoResponse, HttpError> {
    let quickfix = app_state
        .db_client
        .get_quickfix_by_id(body.quickfix_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("QuickFix not found"))?;

    // New chats start in waiting_for_response; an existing chat for this
    // QuickFix is returned as-is
    let chat = app_state
        .db_client
        .create_or_get_chat(&quickfix)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": chat
    })))
}

pub async fn get_user_chats(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ParticipantQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let chats = app_state
        .db_client
        .get_user_chats(query.participant_id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let now = Utc::now();
    let mut chat_details = Vec::new();

    for chat in chats {
        let other_id = chat.other_participant(query.participant_id);
        let other_participant = app_state
            .db_client
            .get_profile(other_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        let last_message = app_state
            .db_client
            .get_last_message(chat.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        let unread_count = app_state
            .db_client
            .get_chat_unread_count(chat.id, query.participant_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        let last_activity = chat
            .last_message_at
            .or_else(|| last_message.as_ref().map(|m| m.created_at))
            .map(|ts| timeline::last_activity_label(ts, now));

        chat_details.push(ChatWithDetails {
            chat,
            other_participant,
            last_message,
            unread_count,
            last_activity,
        });
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": chat_details
    })))
}

pub async fn get_chat_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let chat = fetch_chat(&app_state, chat_id).await?;

    let user = app_state
        .db_client
        .get_profile(chat.user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    let worker = app_state
        .db_client
        .get_profile(chat.worker_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let quickfix = app_state
        .db_client
        .get_quickfix_by_id(chat.quickfix_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "chat": chat,
            "quickfix": quickfix,
            "user": user,
            "worker": worker
        }
    })))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let _ = fetch_chat(&app_state, chat_id).await?;

    let page = pagination.page.unwrap_or(1);
    let limit = pagination.limit.unwrap_or(50) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let messages = app_state
        .db_client
        .get_chat_messages(chat_id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Annotate each message with its date-divider flag
    let mut items = Vec::with_capacity(messages.len());
    let mut previous = None;
    for message in messages {
        let starts_new_day = timeline::needs_date_divider(previous, message.created_at);
        let day_label = starts_new_day.then(|| timeline::divider_label(message.created_at));
        previous = Some(message.created_at);
        items.push(MessageListItem {
            message,
            starts_new_day,
            day_label,
        });
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": items
    })))
}

pub async fn respond_to_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<RespondToRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let action = match body.response.as_str() {
        "accept" => ChatAction::WorkerAccepts,
        "reject" => ChatAction::WorkerRejects,
        _ => return Err(HttpError::bad_request("Response must be 'accept' or 'reject'")),
    };

    let chat = fetch_chat(&app_state, chat_id).await?;

    // Only the requested worker can answer a booking request
    if chat.worker_id != body.worker_id {
        return Err(HttpError::unauthorized(
            "Not authorized to respond to this request",
        ));
    }

    let (updated, _) = app_state.chat_service.execute(&chat, action).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": updated
    })))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let chat = fetch_chat(&app_state, chat_id).await?;

    let action = ChatAction::SendMessage {
        sender_id: body.sender_id,
        content: body.content,
    };
    let (updated, message) = app_state.chat_service.execute(&chat, action).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "chat": updated,
            "message": message
        }
    })))
}

pub async fn get_suggestions(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<ParticipantQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let chat = fetch_chat(&app_state, chat_id).await?;

    if !chat.is_participant(query.participant_id) {
        return Err(HttpError::unauthorized("Not a participant of this chat"));
    }

    let suggestions = app_state
        .chat_service
        .suggestions_for(&chat, query.participant_id);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": suggestions
    })))
}

pub async fn mark_chat_as_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<ReadReceiptDto>,
) -> Result<impl IntoResponse, HttpError> {
    let chat = fetch_chat(&app_state, chat_id).await?;

    if !chat.is_participant(body.reader_id) {
        return Err(HttpError::unauthorized("Not a participant of this chat"));
    }

    app_state
        .db_client
        .mark_messages_as_read(chat_id, body.reader_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Messages marked as read"
    })))
}

pub async fn get_unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ParticipantQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .db_client
        .get_unread_count(query.participant_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "unread_count": count
        }
    })))
}

async fn fetch_chat(app_state: &AppState, chat_id: Uuid) -> Result<Chat, HttpError> {
    app_state
        .db_client
        .get_chat_by_id(chat_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Chat not found"))
}
