use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::loans::models::{Loan, LoanInstallment, LoanStatus};

/// Storage contract for loans
///
/// `activate` is the approval transaction boundary: the status flip and the
/// full installment schedule commit together or not at all.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Persist a freshly applied loan
    async fn insert(&self, loan: &Loan) -> Result<()>;

    async fn find_by_id(&self, loan_id: &str) -> Result<Option<Loan>>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Loan>>;

    async fn list_all(&self) -> Result<Vec<Loan>>;

    /// Flip an `applied` loan to `rejected`
    async fn mark_rejected(&self, loan_id: &str) -> Result<()>;

    /// Commit an approved loan's activation and its installment schedule
    /// in a single transaction
    async fn activate(&self, loan: &Loan, installments: &[LoanInstallment]) -> Result<()>;

    /// Flip an `active` loan to `closed` with a zero balance (pre-closure)
    async fn close(&self, loan_id: &str) -> Result<()>;
}

/// MySQL-backed loan repository
pub struct MySqlLoanRepository {
    pool: MySqlPool,
}

impl MySqlLoanRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_LOAN: &str = r#"
    SELECT id, user_id, amount, interest_rate, tenure_months, emi_amount,
           remaining_amount, purpose, status, start_date, end_date,
           created_at, updated_at
    FROM loans
"#;

#[async_trait]
impl LoanRepository for MySqlLoanRepository {
    async fn insert(&self, loan: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                id, user_id, amount, interest_rate, tenure_months, emi_amount,
                remaining_amount, purpose, status, start_date, end_date,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.user_id)
        .bind(loan.amount)
        .bind(loan.interest_rate)
        .bind(loan.tenure_months)
        .bind(loan.emi_amount)
        .bind(loan.remaining_amount)
        .bind(&loan.purpose)
        .bind(loan.status.to_string())
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, loan_id: &str) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!("{} WHERE id = ?", SELECT_LOAN))
            .bind(loan_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(loan)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            "{} WHERE user_id = ? ORDER BY created_at ASC",
            SELECT_LOAN
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    async fn list_all(&self) -> Result<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!("{} ORDER BY created_at ASC", SELECT_LOAN))
            .fetch_all(&self.pool)
            .await?;

        Ok(loans)
    }

    async fn mark_rejected(&self, loan_id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE loans SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(LoanStatus::Rejected.to_string())
        .bind(chrono::Utc::now().naive_utc())
        .bind(loan_id)
        .bind(LoanStatus::Applied.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::domain(format!(
                "Loan {} is not awaiting a decision",
                loan_id
            )));
        }

        Ok(())
    }

    async fn activate(&self, loan: &Loan, installments: &[LoanInstallment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = ?, interest_rate = ?, emi_amount = ?,
                start_date = ?, end_date = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(LoanStatus::Active.to_string())
        .bind(loan.interest_rate)
        .bind(loan.emi_amount)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.updated_at)
        .bind(&loan.id)
        .bind(LoanStatus::Applied.to_string())
        .execute(tx.as_mut())
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::domain(format!(
                "Loan {} is not awaiting a decision",
                loan.id
            )));
        }

        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO loan_installments (
                    id, loan_id, installment_number, amount, due_date,
                    status, paid_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&installment.id)
            .bind(&installment.loan_id)
            .bind(installment.installment_number)
            .bind(installment.amount)
            .bind(installment.due_date)
            .bind(installment.status.to_string())
            .bind(installment.paid_at)
            .bind(installment.created_at)
            .bind(installment.updated_at)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn close(&self, loan_id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = ?, remaining_amount = 0, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(LoanStatus::Closed.to_string())
        .bind(chrono::Utc::now().naive_utc())
        .bind(loan_id)
        .bind(LoanStatus::Active.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::domain(format!("Loan {} is not active", loan_id)));
        }

        Ok(())
    }
}
