// service/chat_service.rs
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::chatdb::ChatStore,
    models::chatmodels::{Chat, ChatStatus, Message, MessageSnapshot},
    service::error::ServiceError,
};

/// Canned first-contact messages offered while the chat is in
/// getting_suggestions.
pub const USER_SUGGESTIONS: &[&str] = &[
    "How is it going?",
    "Is the time and day okay for you?",
    "I can't wait to work with you!",
];

pub const WORKER_SUGGESTIONS: &[&str] = &[
    "How is it going?",
    "This time doesn't work for me",
    "Happy to take this on!",
];

/// Actions a participant can submit against a chat.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    WorkerAccepts,
    WorkerRejects,
    SendMessage { sender_id: Uuid, content: String },
}

/// The persistence work a transition asks its caller to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEffect {
    PersistStatus(ChatStatus),
    PersistMessage(Message),
    /// Status change and first message are one logical write; see
    /// [`ChatStore::accept_with_message`].
    PersistStatusWithMessage(ChatStatus, Message),
}

/// Advances the negotiation state machine. Pure: the input chat is never
/// mutated, and rejected actions return an error instead of being dropped.
///
/// waiting_for_response --WorkerAccepts--> getting_suggestions
/// waiting_for_response --WorkerRejects--> worker_refused (terminal)
/// getting_suggestions  --SendMessage----> accepted
/// accepted             --SendMessage----> accepted
pub fn transition(chat: &Chat, action: ChatAction) -> Result<(Chat, ChatEffect), ServiceError> {
    match (chat.status, action) {
        (ChatStatus::WaitingForResponse, ChatAction::WorkerAccepts) => {
            let mut updated = chat.clone();
            updated.status = ChatStatus::GettingSuggestions;
            Ok((
                updated,
                ChatEffect::PersistStatus(ChatStatus::GettingSuggestions),
            ))
        }

        (ChatStatus::WaitingForResponse, ChatAction::WorkerRejects) => {
            let mut updated = chat.clone();
            updated.status = ChatStatus::WorkerRefused;
            Ok((
                updated,
                ChatEffect::PersistStatus(ChatStatus::WorkerRefused),
            ))
        }

        (status, ChatAction::SendMessage { sender_id, content }) if status.allows_messaging() => {
            if !chat.is_participant(sender_id) {
                return Err(ServiceError::NotAParticipant(sender_id, chat.id));
            }
            if content.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "Message content cannot be blank".to_string(),
                ));
            }

            let message = Message {
                id: Uuid::new_v4(),
                chat_id: chat.id,
                sender_id,
                content,
                is_read: false,
                created_at: Utc::now(),
            };

            let mut updated = chat.clone();
            updated.last_message_at = Some(message.created_at);

            if status == ChatStatus::GettingSuggestions {
                // The first message seals the deal
                updated.status = ChatStatus::Accepted;
                Ok((
                    updated,
                    ChatEffect::PersistStatusWithMessage(ChatStatus::Accepted, message),
                ))
            } else {
                Ok((updated, ChatEffect::PersistMessage(message)))
            }
        }

        (status, _) => Err(ServiceError::ActionNotAllowed(chat.id, status)),
    }
}

/// Merges a live feed snapshot into the local message sequence, keyed by
/// message id. Known ids are no-ops, so applying the same snapshot twice
/// changes nothing. Malformed records are dropped individually; the rest of
/// the snapshot still merges. The result stays chronologically ordered.
pub fn merge_incoming(local: &[Message], incoming: &[MessageSnapshot]) -> Vec<Message> {
    let mut merged: Vec<Message> = local.to_vec();
    let mut seen: HashSet<Uuid> = local.iter().map(|message| message.id).collect();

    for snapshot in incoming {
        match message_from_snapshot(snapshot) {
            Some(message) => {
                if seen.insert(message.id) {
                    merged.push(message);
                }
            }
            None => {
                tracing::warn!("Dropping malformed message record from chat feed");
            }
        }
    }

    // Stable sort: equal timestamps keep arrival order
    merged.sort_by_key(|message| message.created_at);
    merged
}

fn message_from_snapshot(snapshot: &MessageSnapshot) -> Option<Message> {
    Some(Message {
        id: snapshot.id?,
        chat_id: snapshot.chat_id?,
        sender_id: snapshot.sender_id?,
        content: snapshot.content.clone()?,
        is_read: snapshot.is_read.unwrap_or(false),
        created_at: snapshot.created_at?,
    })
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService").finish()
    }
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Runs the pure transition, then performs its persistence effect. On a
    /// persistence failure nothing is considered sent: the error propagates
    /// and the caller keeps the pre-transition chat. No implicit retry.
    pub async fn execute(
        &self,
        chat: &Chat,
        action: ChatAction,
    ) -> Result<(Chat, Option<Message>), ServiceError> {
        let (updated, effect) = transition(chat, action)?;

        let message = match effect {
            ChatEffect::PersistStatus(status) => {
                self.store.persist_chat_status(chat.id, status).await?;
                None
            }
            ChatEffect::PersistMessage(message) => {
                self.store.append_message(&message).await?;
                Some(message)
            }
            ChatEffect::PersistStatusWithMessage(_, message) => {
                self.store.accept_with_message(chat.id, &message).await?;
                Some(message)
            }
        };

        Ok((updated, message))
    }

    pub fn suggestions_for(&self, chat: &Chat, participant_id: Uuid) -> Vec<String> {
        if chat.status != ChatStatus::GettingSuggestions {
            return Vec::new();
        }

        let source = if participant_id == chat.user_id {
            USER_SUGGESTIONS
        } else {
            WORKER_SUGGESTIONS
        };
        source.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryChatStore {
        statuses: Mutex<HashMap<Uuid, ChatStatus>>,
        messages: Mutex<Vec<Message>>,
        fail_status_writes: AtomicBool,
    }

    impl InMemoryChatStore {
        fn message_count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }

        fn status_of(&self, chat_id: Uuid) -> Option<ChatStatus> {
            self.statuses.lock().unwrap().get(&chat_id).copied()
        }
    }

    #[async_trait]
    impl ChatStore for InMemoryChatStore {
        async fn persist_chat_status(
            &self,
            chat_id: Uuid,
            status: ChatStatus,
        ) -> Result<(), ServiceError> {
            if self.fail_status_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Persistence("status write failed".to_string()));
            }
            self.statuses.lock().unwrap().insert(chat_id, status);
            Ok(())
        }

        async fn append_message(&self, message: &Message) -> Result<(), ServiceError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn accept_with_message(
            &self,
            chat_id: Uuid,
            message: &Message,
        ) -> Result<(), ServiceError> {
            // All-or-nothing: a failed status write leaves no message behind
            if self.fail_status_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Persistence("status write failed".to_string()));
            }
            self.statuses
                .lock()
                .unwrap()
                .insert(chat_id, ChatStatus::Accepted);
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn chat_in(status: ChatStatus) -> Chat {
        Chat {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            quickfix_id: Uuid::new_v4(),
            status,
            last_message_at: None,
            created_at: None,
        }
    }

    fn send(sender_id: Uuid) -> ChatAction {
        ChatAction::SendMessage {
            sender_id,
            content: "hello".to_string(),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn message(id: Uuid, chat_id: Uuid, secs: i64) -> Message {
        Message {
            id,
            chat_id,
            sender_id: Uuid::new_v4(),
            content: "hi".to_string(),
            is_read: false,
            created_at: ts(secs),
        }
    }

    fn snapshot_of(message: &Message) -> MessageSnapshot {
        MessageSnapshot {
            id: Some(message.id),
            chat_id: Some(message.chat_id),
            sender_id: Some(message.sender_id),
            content: Some(message.content.clone()),
            is_read: Some(message.is_read),
            created_at: Some(message.created_at),
        }
    }

    #[test]
    fn worker_accept_moves_to_getting_suggestions_without_a_message() {
        let chat = chat_in(ChatStatus::WaitingForResponse);

        let (updated, effect) = transition(&chat, ChatAction::WorkerAccepts).unwrap();
        assert_eq!(updated.status, ChatStatus::GettingSuggestions);
        assert_eq!(
            effect,
            ChatEffect::PersistStatus(ChatStatus::GettingSuggestions)
        );
    }

    #[test]
    fn first_message_accepts_the_chat_in_one_logical_operation() {
        let chat = chat_in(ChatStatus::GettingSuggestions);

        let (updated, effect) = transition(&chat, send(chat.user_id)).unwrap();
        assert_eq!(updated.status, ChatStatus::Accepted);
        match effect {
            ChatEffect::PersistStatusWithMessage(status, message) => {
                assert_eq!(status, ChatStatus::Accepted);
                assert_eq!(message.sender_id, chat.user_id);
                assert_eq!(updated.last_message_at, Some(message.created_at));
            }
            other => panic!("expected compound effect, got {:?}", other),
        }
    }

    #[test]
    fn sends_in_accepted_stay_accepted() {
        let chat = chat_in(ChatStatus::Accepted);

        let (updated, effect) = transition(&chat, send(chat.worker_id)).unwrap();
        assert_eq!(updated.status, ChatStatus::Accepted);
        assert!(matches!(effect, ChatEffect::PersistMessage(_)));
    }

    #[test]
    fn send_before_worker_response_is_rejected_explicitly() {
        let chat = chat_in(ChatStatus::WaitingForResponse);

        let err = transition(&chat, send(chat.user_id)).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ActionNotAllowed(_, ChatStatus::WaitingForResponse)
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn worker_refused_is_terminal() {
        let chat = chat_in(ChatStatus::WorkerRefused);
        assert!(chat.status.is_terminal());
        assert!(!chat.status.allows_messaging());

        for action in [
            ChatAction::WorkerAccepts,
            ChatAction::WorkerRejects,
            send(chat.user_id),
            send(chat.worker_id),
        ] {
            let err = transition(&chat, action).unwrap_err();
            assert!(matches!(
                err,
                ServiceError::ActionNotAllowed(_, ChatStatus::WorkerRefused)
            ));
        }
    }

    #[test]
    fn outsiders_cannot_send() {
        let chat = chat_in(ChatStatus::Accepted);

        let err = transition(&chat, send(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, ServiceError::NotAParticipant(_, _)));
    }

    #[test]
    fn blank_content_is_rejected() {
        let chat = chat_in(ChatStatus::Accepted);
        let action = ChatAction::SendMessage {
            sender_id: chat.user_id,
            content: "   ".to_string(),
        };

        assert!(matches!(
            transition(&chat, action).unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn accept_and_send_is_atomic_under_status_write_failure() {
        let store = Arc::new(InMemoryChatStore::default());
        let service = ChatService::new(store.clone());
        let chat = chat_in(ChatStatus::GettingSuggestions);

        store.fail_status_writes.store(true, Ordering::SeqCst);
        let err = service.execute(&chat, send(chat.user_id)).await.unwrap_err();
        assert!(err.is_retryable());

        // Neither the status nor the message became visible
        assert_eq!(store.status_of(chat.id), None);
        assert_eq!(store.message_count(), 0);

        // The same send succeeds once persistence recovers
        store.fail_status_writes.store(false, Ordering::SeqCst);
        let (updated, message) = service.execute(&chat, send(chat.user_id)).await.unwrap();
        assert_eq!(updated.status, ChatStatus::Accepted);
        assert!(message.is_some());
        assert_eq!(store.status_of(chat.id), Some(ChatStatus::Accepted));
        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn refused_chat_accumulates_no_messages() {
        let store = Arc::new(InMemoryChatStore::default());
        let service = ChatService::new(store.clone());
        let chat = chat_in(ChatStatus::WaitingForResponse);

        let (refused, _) = service
            .execute(&chat, ChatAction::WorkerRejects)
            .await
            .unwrap();
        assert_eq!(refused.status, ChatStatus::WorkerRefused);

        for _ in 0..3 {
            assert!(service
                .execute(&refused, send(refused.user_id))
                .await
                .is_err());
        }
        assert_eq!(store.message_count(), 0);
        assert_eq!(store.status_of(chat.id), Some(ChatStatus::WorkerRefused));
    }

    #[test]
    fn merge_is_idempotent_and_keeps_chronological_order() {
        let chat_id = Uuid::new_v4();
        let first = message(Uuid::new_v4(), chat_id, 100);
        let second = message(Uuid::new_v4(), chat_id, 200);
        let third = message(Uuid::new_v4(), chat_id, 300);

        let local = vec![first.clone(), third.clone()];
        // Snapshot redelivers a known message alongside a new one
        let incoming = vec![snapshot_of(&third), snapshot_of(&second)];

        let merged = merge_incoming(&local, &incoming);
        assert_eq!(merged, vec![first.clone(), second.clone(), third.clone()]);

        // Applying the same snapshot again changes nothing
        let again = merge_incoming(&merged, &incoming);
        assert_eq!(again, merged);
    }

    #[test]
    fn malformed_records_are_dropped_without_failing_the_merge() {
        let chat_id = Uuid::new_v4();
        let valid = message(Uuid::new_v4(), chat_id, 100);
        let malformed = MessageSnapshot {
            id: Some(Uuid::new_v4()),
            content: None, // missing body
            ..Default::default()
        };

        let merged = merge_incoming(&[], &[malformed, snapshot_of(&valid)]);
        assert_eq!(merged, vec![valid]);
    }

    #[test]
    fn suggestions_only_offered_while_getting_suggestions() {
        let store = Arc::new(InMemoryChatStore::default());
        let service = ChatService::new(store);

        let chat = chat_in(ChatStatus::GettingSuggestions);
        assert!(!service.suggestions_for(&chat, chat.user_id).is_empty());
        assert_ne!(
            service.suggestions_for(&chat, chat.user_id),
            service.suggestions_for(&chat, chat.worker_id)
        );

        let accepted = chat_in(ChatStatus::Accepted);
        assert!(service.suggestions_for(&accepted, accepted.user_id).is_empty());
    }
}
