use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::core::Result;
use crate::modules::notifications::services::NotificationSink;

/// MySQL-backed notification sink: notifications are stored for later
/// delivery by the (external) notification subsystem
pub struct MySqlNotificationSink {
    pool: MySqlPool,
}

impl MySqlNotificationSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for MySqlNotificationSink {
    async fn notify(&self, user_id: &str, message: &str, category: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, message, category, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(message)
        .bind(category)
        .bind(chrono::Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
