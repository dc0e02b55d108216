use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::users::models::UserRecord;
use crate::modules::users::services::UserDirectory;

/// MySQL-backed user directory
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, role FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))
    }
}
