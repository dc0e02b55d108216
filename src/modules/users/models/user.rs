use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role; only `Business` accounts may apply for loans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Personal,
    Business,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Business => "BUSINESS",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "PERSONAL" => Ok(Self::Personal),
            "BUSINESS" => Ok(Self::Business),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("Invalid role: {}", value)),
        }
    }
}

/// The slice of a user the loan core needs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}
