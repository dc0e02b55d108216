use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// A committed wallet balance movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub memo: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The wallet subsystem's credit/debit interface, the sole authority over
/// balance mutation. The loan core never touches balances directly and must
/// treat every call as possibly failing.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Add funds to a wallet. Fails with `NotFound` if the wallet does not
    /// exist; never fails for insufficient funds.
    async fn credit(&self, user_id: &str, amount: Decimal, memo: &str) -> Result<LedgerEntry>;

    /// Remove funds from a wallet. Fails with `InsufficientFunds` if the
    /// balance is too low, `NotFound` if the wallet does not exist.
    async fn debit(&self, user_id: &str, amount: Decimal, memo: &str) -> Result<LedgerEntry>;
}
