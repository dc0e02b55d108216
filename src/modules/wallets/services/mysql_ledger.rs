use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::wallets::services::ledger_gateway::{EntryKind, LedgerEntry, LedgerGateway};

/// MySQL-backed ledger gateway
///
/// Every movement locks the wallet row (`SELECT ... FOR UPDATE`) so that
/// concurrent transfers, disbursements, and repayments serialize per wallet.
pub struct MySqlLedgerGateway {
    pool: MySqlPool,
}

impl MySqlLedgerGateway {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn locked_balance(
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
    ) -> Result<Decimal> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = ? FOR UPDATE")
                .bind(user_id)
                .fetch_optional(tx.as_mut())
                .await?;

        balance.ok_or_else(|| AppError::not_found(format!("Wallet not found for user {}", user_id)))
    }

    async fn record_entry(
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
        kind: EntryKind,
        amount: Decimal,
        memo: &str,
    ) -> Result<LedgerEntry> {
        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            amount,
            memo: memo.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (id, user_id, kind, amount, memo, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.kind.to_string())
        .bind(entry.amount)
        .bind(&entry.memo)
        .bind(entry.created_at)
        .execute(tx.as_mut())
        .await?;

        Ok(entry)
    }
}

#[async_trait]
impl LedgerGateway for MySqlLedgerGateway {
    async fn credit(&self, user_id: &str, amount: Decimal, memo: &str) -> Result<LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(AppError::domain("Credit amount must be positive"));
        }

        let mut tx = self.pool.begin().await?;

        let balance = Self::locked_balance(&mut tx, user_id).await?;

        sqlx::query("UPDATE wallets SET balance = ? WHERE user_id = ?")
            .bind(balance + amount)
            .bind(user_id)
            .execute(tx.as_mut())
            .await?;

        let entry = Self::record_entry(&mut tx, user_id, EntryKind::Credit, amount, memo).await?;

        tx.commit().await?;

        info!(user_id, amount = %amount, memo, "wallet credited");

        Ok(entry)
    }

    async fn debit(&self, user_id: &str, amount: Decimal, memo: &str) -> Result<LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(AppError::domain("Debit amount must be positive"));
        }

        let mut tx = self.pool.begin().await?;

        let balance = Self::locked_balance(&mut tx, user_id).await?;

        if balance < amount {
            tx.rollback().await?;
            return Err(AppError::insufficient_funds(format!(
                "Balance {} is below requested debit {}",
                balance, amount
            )));
        }

        sqlx::query("UPDATE wallets SET balance = ? WHERE user_id = ?")
            .bind(balance - amount)
            .bind(user_id)
            .execute(tx.as_mut())
            .await?;

        let entry = Self::record_entry(&mut tx, user_id, EntryKind::Debit, amount, memo).await?;

        tx.commit().await?;

        info!(user_id, amount = %amount, memo, "wallet debited");

        Ok(entry)
    }
}
