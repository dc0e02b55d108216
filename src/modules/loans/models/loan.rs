use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Longest tenure the schedule generator accepts
pub const MAX_TENURE_MONTHS: u32 = 360;

/// A micro-lending loan owned by exactly one user
///
/// Created on application in `Applied` status and never deleted afterwards.
/// `remaining_amount` is non-negative and strictly decreases with each
/// successful repayment; the loan is `Closed` exactly when it reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: String,
    pub user_id: String,
    /// Principal requested at application time
    pub amount: Decimal,
    /// Annual interest rate in percent, set at approval
    pub interest_rate: Option<Decimal>,
    pub tenure_months: u32,
    /// Fixed monthly installment, computed at approval
    pub emi_amount: Option<Decimal>,
    pub remaining_amount: Decimal,
    pub purpose: String,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Loan lifecycle status
///
/// `Applied -> Active -> Closed`, or `Applied -> Rejected`. No transition
/// ever leaves `Closed` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Applied,
    Active,
    Closed,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "applied" => Ok(Self::Applied),
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid loan status: {}", value)),
        }
    }
}

impl Loan {
    /// Create a new loan application in `Applied` status
    pub fn apply(
        user_id: impl Into<String>,
        amount: Decimal,
        tenure_months: u32,
        purpose: impl Into<String>,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::domain("Loan amount must be positive"));
        }

        if tenure_months == 0 || tenure_months > MAX_TENURE_MONTHS {
            return Err(AppError::domain(format!(
                "Tenure must be between 1 and {} months, got {}",
                MAX_TENURE_MONTHS, tenure_months
            )));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            amount,
            interest_rate: None,
            tenure_months,
            emi_amount: None,
            remaining_amount: amount,
            purpose: purpose.into(),
            status: LoanStatus::Applied,
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Activate an approved loan: set rate, EMI, and the repayment window
    pub fn activate(
        &mut self,
        interest_rate: Decimal,
        emi_amount: Decimal,
        start_date: NaiveDate,
    ) -> Result<()> {
        if self.status != LoanStatus::Applied {
            return Err(AppError::domain(format!(
                "Loan {} is not awaiting a decision",
                self.id
            )));
        }

        let end_date = start_date
            .checked_add_months(chrono::Months::new(self.tenure_months))
            .ok_or_else(|| AppError::domain("Failed to calculate loan end date"))?;

        self.interest_rate = Some(interest_rate);
        self.emi_amount = Some(emi_amount);
        self.status = LoanStatus::Active;
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Reject a loan still awaiting a decision (terminal)
    pub fn reject(&mut self) -> Result<()> {
        if self.status != LoanStatus::Applied {
            return Err(AppError::domain(format!(
                "Loan {} is not awaiting a decision",
                self.id
            )));
        }

        self.status = LoanStatus::Rejected;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Reduce the balance by a settled installment's face amount
    ///
    /// The overdue penalty never flows through here; only the face amount
    /// reduces the loan balance. Returns true when the loan closed.
    pub fn record_repayment(&mut self, face_amount: Decimal) -> Result<bool> {
        if self.status != LoanStatus::Active {
            return Err(AppError::domain(format!("Loan {} is not active", self.id)));
        }

        self.remaining_amount -= face_amount;
        self.updated_at = chrono::Utc::now().naive_utc();

        if self.remaining_amount <= Decimal::ZERO {
            self.remaining_amount = Decimal::ZERO;
            self.status = LoanStatus::Closed;
            return Ok(true);
        }

        Ok(false)
    }

    /// Settle the full balance early (pre-closure)
    pub fn pre_close(&mut self) -> Result<()> {
        if self.status != LoanStatus::Active {
            return Err(AppError::domain(format!("Loan {} is not active", self.id)));
        }

        self.remaining_amount = Decimal::ZERO;
        self.status = LoanStatus::Closed;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }
}
