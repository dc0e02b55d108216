use async_trait::async_trait;

use crate::core::Result;

/// Fire-and-forget notification contract
///
/// The loan core never relies on the return value beyond logging; a failed
/// notification must not fail the business operation that triggered it.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, user_id: &str, message: &str, category: &str) -> Result<()>;
}
