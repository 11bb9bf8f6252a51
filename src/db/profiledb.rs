// db/profiledb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::profilemodels::*;

#[async_trait]
pub trait ProfileExt {
    /// One consistent snapshot of the worker collection for the search
    /// pipeline to filter in memory.
    async fn get_worker_profiles(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkerProfile>, Error>;

    async fn get_worker_profile(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<WorkerProfile>, Error>;

    async fn get_user_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, Error>;

    /// Resolve an id to whichever profile variant it belongs to.
    async fn get_profile(
        &self,
        id: Uuid,
    ) -> Result<Option<Profile>, Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn get_worker_profiles(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkerProfile>, Error> {
        sqlx::query_as::<_, WorkerProfile>(
            r#"
            SELECT id, display_name, field_of_work, description, tags,
                   working_hours_start, working_hours_end, unavailable_dates,
                   rating, hourly_rate, created_at, updated_at
            FROM worker_profiles
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_worker_profile(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<WorkerProfile>, Error> {
        sqlx::query_as::<_, WorkerProfile>(
            r#"
            SELECT id, display_name, field_of_work, description, tags,
                   working_hours_start, working_hours_end, unavailable_dates,
                   rating, hourly_rate, created_at, updated_at
            FROM worker_profiles
            WHERE id = $1
            "#
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, display_name, created_at
            FROM user_profiles
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profile(
        &self,
        id: Uuid,
    ) -> Result<Option<Profile>, Error> {
        if let Some(worker) = self.get_worker_profile(id).await? {
            return Ok(Some(Profile::Worker(worker)));
        }

        Ok(self.get_user_profile(id).await?.map(Profile::User))
    }
}
