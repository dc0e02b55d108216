use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::{AppError, Result};
use crate::modules::loans::models::{InstallmentStatus, LoanInstallment, LoanStatus};

/// A pending installment past its due date, joined with its loan's owner
/// so the sweeper can notify without extra lookups
#[derive(Debug, Clone, FromRow)]
pub struct DueInstallment {
    pub installment_id: String,
    pub loan_id: String,
    pub user_id: String,
    pub installment_number: u32,
    pub due_date: NaiveDate,
}

/// Result of settling an installment against its loan
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub remaining_amount: Decimal,
    pub loan_closed: bool,
}

/// Storage contract for installments
///
/// Status flips are compare-and-swap operations: they only apply when the
/// row is still in the expected state, so a concurrent sweeper and repayment
/// can never both win the same transition.
#[async_trait]
pub trait InstallmentRepository: Send + Sync {
    /// All installments of a loan, ordered by installment number
    async fn find_by_loan(&self, loan_id: &str) -> Result<Vec<LoanInstallment>>;

    /// All installments across all loans of a user (credit scoring input)
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<LoanInstallment>>;

    /// First installment (by number) still `pending` or `overdue`
    async fn first_payable(&self, loan_id: &str) -> Result<Option<LoanInstallment>>;

    /// Pending installments strictly before the given date
    async fn pending_due_before(&self, date: NaiveDate) -> Result<Vec<DueInstallment>>;

    /// CAS `pending` -> `overdue`; returns false if the row moved on already
    async fn mark_overdue_if_pending(&self, installment_id: &str) -> Result<bool>;

    /// Settle a repayment in one transaction: CAS the installment to `paid`,
    /// reduce the loan balance by the face amount, and close the loan when
    /// the balance reaches zero. Fails with a domain error if the
    /// installment is no longer payable.
    async fn settle(
        &self,
        loan_id: &str,
        installment_id: &str,
        face_amount: Decimal,
    ) -> Result<SettlementOutcome>;
}

/// MySQL-backed installment repository
pub struct MySqlInstallmentRepository {
    pool: MySqlPool,
}

impl MySqlInstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_INSTALLMENT: &str = r#"
    SELECT id, loan_id, installment_number, amount, due_date, status,
           paid_at, created_at, updated_at
    FROM loan_installments
"#;

#[async_trait]
impl InstallmentRepository for MySqlInstallmentRepository {
    async fn find_by_loan(&self, loan_id: &str) -> Result<Vec<LoanInstallment>> {
        let installments = sqlx::query_as::<_, LoanInstallment>(&format!(
            "{} WHERE loan_id = ? ORDER BY installment_number ASC",
            SELECT_INSTALLMENT
        ))
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<LoanInstallment>> {
        let installments = sqlx::query_as::<_, LoanInstallment>(
            r#"
            SELECT i.id, i.loan_id, i.installment_number, i.amount, i.due_date,
                   i.status, i.paid_at, i.created_at, i.updated_at
            FROM loan_installments i
            JOIN loans l ON l.id = i.loan_id
            WHERE l.user_id = ?
            ORDER BY i.created_at ASC, i.installment_number ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    async fn first_payable(&self, loan_id: &str) -> Result<Option<LoanInstallment>> {
        let installment = sqlx::query_as::<_, LoanInstallment>(&format!(
            "{} WHERE loan_id = ? AND status IN (?, ?) ORDER BY installment_number ASC LIMIT 1",
            SELECT_INSTALLMENT
        ))
        .bind(loan_id)
        .bind(InstallmentStatus::Pending.to_string())
        .bind(InstallmentStatus::Overdue.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(installment)
    }

    async fn pending_due_before(&self, date: NaiveDate) -> Result<Vec<DueInstallment>> {
        let due = sqlx::query_as::<_, DueInstallment>(
            r#"
            SELECT i.id AS installment_id, i.loan_id, l.user_id,
                   i.installment_number, i.due_date
            FROM loan_installments i
            JOIN loans l ON l.id = i.loan_id
            WHERE i.status = ? AND i.due_date < ?
            ORDER BY i.due_date ASC
            "#,
        )
        .bind(InstallmentStatus::Pending.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(due)
    }

    async fn mark_overdue_if_pending(&self, installment_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE loan_installments SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(InstallmentStatus::Overdue.to_string())
        .bind(chrono::Utc::now().naive_utc())
        .bind(installment_id)
        .bind(InstallmentStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn settle(
        &self,
        loan_id: &str,
        installment_id: &str,
        face_amount: Decimal,
    ) -> Result<SettlementOutcome> {
        let mut tx = self.pool.begin().await?;

        let now = chrono::Utc::now().naive_utc();

        let flipped = sqlx::query(
            r#"
            UPDATE loan_installments
            SET status = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND loan_id = ? AND status IN (?, ?)
            "#,
        )
        .bind(InstallmentStatus::Paid.to_string())
        .bind(now)
        .bind(now)
        .bind(installment_id)
        .bind(loan_id)
        .bind(InstallmentStatus::Pending.to_string())
        .bind(InstallmentStatus::Overdue.to_string())
        .execute(tx.as_mut())
        .await?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::domain("Installment is no longer payable"));
        }

        let remaining: Option<Decimal> =
            sqlx::query_scalar("SELECT remaining_amount FROM loans WHERE id = ? FOR UPDATE")
                .bind(loan_id)
                .fetch_optional(tx.as_mut())
                .await?;

        let remaining = match remaining {
            Some(r) => r,
            None => {
                tx.rollback().await?;
                return Err(AppError::not_found(format!("Loan {} not found", loan_id)));
            }
        };

        let new_remaining = remaining - face_amount;
        let loan_closed = new_remaining <= Decimal::ZERO;
        let new_remaining = if loan_closed {
            Decimal::ZERO
        } else {
            new_remaining
        };

        if loan_closed {
            sqlx::query(
                "UPDATE loans SET remaining_amount = ?, status = ?, updated_at = ? WHERE id = ?",
            )
            .bind(new_remaining)
            .bind(LoanStatus::Closed.to_string())
            .bind(now)
            .bind(loan_id)
            .execute(tx.as_mut())
            .await?;
        } else {
            sqlx::query("UPDATE loans SET remaining_amount = ?, updated_at = ? WHERE id = ?")
                .bind(new_remaining)
                .bind(now)
                .bind(loan_id)
                .execute(tx.as_mut())
                .await?;
        }

        tx.commit().await?;

        Ok(SettlementOutcome {
            remaining_amount: new_remaining,
            loan_closed,
        })
    }
}
