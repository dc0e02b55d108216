use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// One EMI installment of a loan
///
/// Exactly `tenure_months` installments exist per loan, generated atomically
/// at approval time with consecutive monthly due dates. An installment never
/// outlives its loan and never regresses from `Paid`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoanInstallment {
    pub id: String,
    pub loan_id: String,
    /// Sequential number (1..=tenure_months)
    pub installment_number: u32,
    /// Face amount, equal to the loan's EMI at generation time
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: InstallmentStatus,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Installment status: mutually exclusive and monotonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Not yet paid, due date not passed
    Pending,
    /// Settled via repayment
    Paid,
    /// Due date passed without payment
    Overdue,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

impl LoanInstallment {
    pub fn new(
        loan_id: impl Into<String>,
        installment_number: u32,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<Self> {
        if installment_number == 0 {
            return Err(AppError::domain("Installment number must be at least 1"));
        }

        if amount <= Decimal::ZERO {
            return Err(AppError::domain("Installment amount must be positive"));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            loan_id: loan_id.into(),
            installment_number,
            amount,
            due_date,
            status: InstallmentStatus::Pending,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether a repayment may target this installment
    pub fn is_payable(&self) -> bool {
        matches!(
            self.status,
            InstallmentStatus::Pending | InstallmentStatus::Overdue
        )
    }

    /// Mark as paid; only valid from `Pending` or `Overdue`
    pub fn mark_paid(&mut self) -> Result<()> {
        if !self.is_payable() {
            return Err(AppError::domain(format!(
                "Installment {} is already paid",
                self.installment_number
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        self.status = InstallmentStatus::Paid;
        self.paid_at = Some(now);
        self.updated_at = now;

        Ok(())
    }

    /// Mark as overdue; only `Pending` installments transition
    pub fn mark_overdue(&mut self) -> Result<()> {
        if self.status != InstallmentStatus::Pending {
            return Err(AppError::domain(format!(
                "Installment {} is not pending",
                self.installment_number
            )));
        }

        self.status = InstallmentStatus::Overdue;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InstallmentStatus::Pending && self.due_date < today
    }
}
