pub mod repositories;
pub mod services;

pub use repositories::MySqlNotificationSink;
pub use services::{messages, NotificationSink};
