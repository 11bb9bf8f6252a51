// db/quickfixdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::quickfixmodels::QuickFix;

#[async_trait]
pub trait QuickFixExt {
    async fn create_quickfix(
        &self,
        user_id: Uuid,
        worker_id: Uuid,
        title: String,
    ) -> Result<QuickFix, Error>;

    async fn get_quickfix_by_id(
        &self,
        quickfix_id: Uuid,
    ) -> Result<Option<QuickFix>, Error>;
}

#[async_trait]
impl QuickFixExt for DBClient {
    async fn create_quickfix(
        &self,
        user_id: Uuid,
        worker_id: Uuid,
        title: String,
    ) -> Result<QuickFix, Error> {
        sqlx::query_as::<_, QuickFix>(
            r#"
            INSERT INTO quickfixes (user_id, worker_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, worker_id, title, created_at
            "#
        )
        .bind(user_id)
        .bind(worker_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_quickfix_by_id(
        &self,
        quickfix_id: Uuid,
    ) -> Result<Option<QuickFix>, Error> {
        sqlx::query_as::<_, QuickFix>(
            r#"
            SELECT id, user_id, worker_id, title, created_at
            FROM quickfixes
            WHERE id = $1
            "#
        )
        .bind(quickfix_id)
        .fetch_optional(&self.pool)
        .await
    }
}
