pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Role, UserRecord};
pub use repositories::MySqlUserDirectory;
pub use services::UserDirectory;
