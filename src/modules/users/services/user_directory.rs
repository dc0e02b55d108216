use async_trait::async_trait;

use crate::core::Result;
use crate::modules::users::models::UserRecord;

/// Narrow read-only contract over the user subsystem
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fails with `NotFound` if the user does not exist
    async fn find_by_id(&self, user_id: &str) -> Result<UserRecord>;
}
