// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodels::*;
use crate::models::quickfixmodels::QuickFix;
use crate::service::error::ServiceError;

#[async_trait]
pub trait ChatExt {
    // Chat management
    async fn create_or_get_chat(
        &self,
        quickfix: &QuickFix,
    ) -> Result<Chat, Error>;

    async fn get_chat_by_id(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Chat>, Error>;

    async fn get_user_chats(
        &self,
        participant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, Error>;

    // Message management
    async fn get_chat_messages(
        &self,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error>;

    async fn get_last_message(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Message>, Error>;

    async fn mark_messages_as_read(
        &self,
        chat_id: Uuid,
        reader_id: Uuid,
    ) -> Result<(), Error>;

    async fn get_chat_unread_count(
        &self,
        chat_id: Uuid,
        participant_id: Uuid,
    ) -> Result<i64, Error>;

    async fn get_unread_count(
        &self,
        participant_id: Uuid,
    ) -> Result<i64, Error>;
}

/// Persistence collaborator for the negotiation state machine. Implemented
/// here over Postgres; tests substitute an in-memory store.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn persist_chat_status(
        &self,
        chat_id: Uuid,
        status: ChatStatus,
    ) -> Result<(), ServiceError>;

    async fn append_message(
        &self,
        message: &Message,
    ) -> Result<(), ServiceError>;

    /// Compound write behind the getting_suggestions -> accepted transition.
    /// Implementations must make status update and message append
    /// all-or-nothing: a failed status write leaves no message behind.
    async fn accept_with_message(
        &self,
        chat_id: Uuid,
        message: &Message,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_or_get_chat(
        &self,
        quickfix: &QuickFix,
    ) -> Result<Chat, Error> {
        // Each QuickFix has at most one chat
        let existing = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, worker_id, quickfix_id, status,
                   last_message_at, created_at
            FROM chats
            WHERE quickfix_id = $1
            "#
        )
        .bind(quickfix.id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(chat) = existing {
            return Ok(chat);
        }

        sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (user_id, worker_id, quickfix_id, status)
            VALUES ($1, $2, $3, 'waiting_for_response'::chat_status)
            RETURNING id, user_id, worker_id, quickfix_id, status,
                      last_message_at, created_at
            "#
        )
        .bind(quickfix.user_id)
        .bind(quickfix.worker_id)
        .bind(quickfix.id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_chat_by_id(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Chat>, Error> {
        sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, worker_id, quickfix_id, status,
                   last_message_at, created_at
            FROM chats
            WHERE id = $1
            "#
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_chats(
        &self,
        participant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, Error> {
        sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, worker_id, quickfix_id, status,
                   last_message_at, created_at
            FROM chats
            WHERE user_id = $1 OR worker_id = $1
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(participant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_chat_messages(
        &self,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error> {
        // Chronological: insertion order is display order
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, content, is_read, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_last_message(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, content, is_read, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_messages_as_read(
        &self,
        chat_id: Uuid,
        reader_id: Uuid,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE messages
            SET is_read = true
            WHERE chat_id = $1
              AND sender_id != $2
              AND is_read = false
            "#
        )
        .bind(chat_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_chat_unread_count(
        &self,
        chat_id: Uuid,
        participant_id: Uuid,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE chat_id = $1
              AND sender_id != $2
              AND is_read = false
            "#
        )
        .bind(chat_id)
        .bind(participant_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_unread_count(
        &self,
        participant_id: Uuid,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages m
            INNER JOIN chats c ON m.chat_id = c.id
            WHERE (c.user_id = $1 OR c.worker_id = $1)
              AND m.sender_id != $1
              AND m.is_read = false
            "#
        )
        .bind(participant_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl ChatStore for DBClient {
    async fn persist_chat_status(
        &self,
        chat_id: Uuid,
        status: ChatStatus,
    ) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET status = $2
            WHERE id = $1
            "#
        )
        .bind(chat_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ChatNotFound(chat_id));
        }

        Ok(())
    }

    async fn append_message(
        &self,
        message: &Message,
    ) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(message.id)
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE chats
            SET last_message_at = $2
            WHERE id = $1
            "#
        )
        .bind(message.chat_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn accept_with_message(
        &self,
        chat_id: Uuid,
        message: &Message,
    ) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE chats
            SET status = 'accepted'::chat_status, last_message_at = $2
            WHERE id = $1
            "#
        )
        .bind(chat_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls everything back
            return Err(ServiceError::ChatNotFound(chat_id));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(message.id)
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
