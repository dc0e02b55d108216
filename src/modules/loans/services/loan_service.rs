use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Months;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::{AppError, Result};
use crate::modules::loans::models::{
    EligibilityReport, InstallmentStatus, Loan, LoanInstallment, LoanRecommendation, LoanStatus,
};
use crate::modules::loans::repositories::{InstallmentRepository, LoanRepository};
use crate::modules::loans::services::{CreditService, EmiCalculator};
use crate::modules::notifications::services::messages;
use crate::modules::notifications::NotificationSink;
use crate::modules::users::{Role, UserDirectory};
use crate::modules::wallets::LedgerGateway;

/// Flat penalty added to the wallet debit when paying an overdue installment.
/// The penalty never reduces the loan balance; only the face amount does.
pub const OVERDUE_PENALTY: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// A new loan application
#[derive(Debug, Clone, Deserialize)]
pub struct LoanApplication {
    pub amount: Decimal,
    pub tenure_months: u32,
    pub purpose: String,
}

/// An admin decision on an applied loan
#[derive(Debug, Clone, Deserialize)]
pub struct LoanDecision {
    pub approved: bool,
    /// Explicit annual rate override; falls back to the dynamic rate
    pub interest_rate: Option<Decimal>,
}

/// Outcome of a successful repayment
#[derive(Debug, Clone, Serialize)]
pub struct RepaymentReceipt {
    pub loan_id: String,
    pub installment_number: u32,
    /// Amount debited from the wallet, including any overdue penalty
    pub amount_paid: Decimal,
    pub penalty_applied: bool,
    pub remaining_amount: Decimal,
    pub loan_closed: bool,
}

/// The loan lifecycle state machine: apply, approve/reject, repay, pre-close
///
/// All dependencies are injected; the service never reaches for globals.
/// Ledger movements and loan-state writes are kept consistent with a saga:
/// the ledger moves first, and a failed state write triggers an explicit
/// compensating movement before the error propagates.
pub struct LoanService {
    loans: Arc<dyn LoanRepository>,
    installments: Arc<dyn InstallmentRepository>,
    users: Arc<dyn UserDirectory>,
    ledger: Arc<dyn LedgerGateway>,
    notifications: Arc<dyn NotificationSink>,
    credit: CreditService,
    // Single writer per loan: concurrent repayments must not both pick the
    // same first-payable installment
    repayment_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LoanService {
    pub fn new(
        loans: Arc<dyn LoanRepository>,
        installments: Arc<dyn InstallmentRepository>,
        users: Arc<dyn UserDirectory>,
        ledger: Arc<dyn LedgerGateway>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let credit = CreditService::new(installments.clone());
        Self {
            loans,
            installments,
            users,
            ledger,
            notifications,
            credit,
            repayment_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn credit(&self) -> &CreditService {
        &self.credit
    }

    /// Apply for a loan. BUSINESS accounts only; the amount must pass the
    /// strict eligibility check before anything is persisted.
    pub async fn apply(&self, user_id: &str, application: LoanApplication) -> Result<Loan> {
        info!(user_id, amount = %application.amount, "loan application received");

        let user = self.users.find_by_id(user_id).await?;

        if user.role != Role::Business {
            warn!(user_id, role = %user.role, "non-business loan application refused");
            return Err(AppError::forbidden(
                "Only business accounts may apply for loans",
            ));
        }

        let loan = Loan::apply(
            user_id,
            application.amount,
            application.tenure_months,
            application.purpose,
        )?;

        if !self
            .credit
            .is_eligible_for_loan(user_id, application.amount)
            .await?
        {
            return Err(AppError::domain("Loan amount exceeds eligibility"));
        }

        self.loans.insert(&loan).await?;

        info!(user_id, loan_id = %loan.id, "loan application saved");

        self.notify(user_id, messages::loan_applied(application.amount))
            .await;

        Ok(loan)
    }

    /// Decide an applied loan: reject it, or approve it and disburse
    ///
    /// Approval is one atomic unit. The wallet is credited first; the status
    /// flip and the full installment schedule then commit in a single
    /// transaction, and if that fails the disbursement is reversed so the
    /// loan stays `Applied` with no installments.
    pub async fn decide(&self, loan_id: &str, decision: LoanDecision) -> Result<Loan> {
        info!(loan_id, approved = decision.approved, "loan decision received");

        let mut loan = self.find_loan(loan_id).await?;

        if !decision.approved {
            loan.reject()?;
            self.loans.mark_rejected(loan_id).await?;

            warn!(loan_id, "loan rejected");
            self.notify(&loan.user_id, messages::loan_rejected()).await;

            return Ok(loan);
        }

        let interest_rate = match decision.interest_rate {
            Some(rate) if rate >= Decimal::ZERO => rate,
            Some(_) => return Err(AppError::domain("Interest rate cannot be negative")),
            None => self.credit.dynamic_interest(&loan.user_id).await?,
        };

        let emi = EmiCalculator::calculate_emi(loan.amount, interest_rate, loan.tenure_months)?;

        let start_date = chrono::Utc::now().date_naive();
        loan.activate(interest_rate, emi, start_date)?;

        let installments = Self::generate_installments(&loan)?;

        // Disburse, then commit activation + schedule atomically
        self.ledger
            .credit(&loan.user_id, loan.amount, "Loan Disbursement")
            .await?;

        if let Err(e) = self.loans.activate(&loan, &installments).await {
            error!(loan_id, error = %e, "activation failed after disbursement, reversing credit");

            if let Err(reversal) = self
                .ledger
                .debit(&loan.user_id, loan.amount, "Loan Disbursement Reversal")
                .await
            {
                error!(
                    loan_id,
                    error = %reversal,
                    "failed to reverse disbursement; wallet and loan state diverge"
                );
            }

            return Err(e);
        }

        info!(
            loan_id,
            interest_rate = %interest_rate,
            emi = %emi,
            installments = installments.len(),
            "loan approved and disbursed"
        );

        self.notify(&loan.user_id, messages::loan_approved()).await;

        Ok(loan)
    }

    /// Exactly `tenure_months` installments, due monthly starting one month
    /// after approval, each at the loan's EMI
    fn generate_installments(loan: &Loan) -> Result<Vec<LoanInstallment>> {
        let emi = loan
            .emi_amount
            .ok_or_else(|| AppError::internal("EMI not set on activated loan"))?;
        let start_date = loan
            .start_date
            .ok_or_else(|| AppError::internal("Start date not set on activated loan"))?;

        let mut installments = Vec::with_capacity(loan.tenure_months as usize);

        for number in 1..=loan.tenure_months {
            let due_date = start_date
                .checked_add_months(Months::new(number))
                .ok_or_else(|| AppError::domain("Failed to calculate installment due date"))?;

            installments.push(LoanInstallment::new(&loan.id, number, emi, due_date)?);
        }

        Ok(installments)
    }

    /// Repay the first pending or overdue installment of the caller's loan
    ///
    /// Overdue installments carry a flat penalty on the wallet debit. The
    /// debit happens before the installment flips; if the settlement
    /// transaction fails the debit is reversed and the installment stays
    /// untouched.
    pub async fn repay(&self, user_id: &str, loan_id: &str) -> Result<RepaymentReceipt> {
        let lock = self.lock_for(loan_id);
        let _guard = lock.lock().await;

        info!(user_id, loan_id, "loan repayment initiated");

        let loan = self.find_loan(loan_id).await?;

        if loan.user_id != user_id {
            warn!(user_id, loan_id, "repayment attempt by non-owner");
            return Err(AppError::forbidden("Only the loan owner may repay"));
        }

        if loan.status != LoanStatus::Active {
            return Err(AppError::domain(format!("Loan {} is not active", loan_id)));
        }

        let next = self
            .installments
            .first_payable(loan_id)
            .await?
            .ok_or_else(|| AppError::domain("No pending installment"))?;

        let penalty_applied = next.status == InstallmentStatus::Overdue;
        let payable = if penalty_applied {
            warn!(loan_id, installment = next.installment_number, "overdue EMI, penalty applied");
            next.amount + OVERDUE_PENALTY
        } else {
            next.amount
        };

        self.ledger.debit(user_id, payable, "EMI Payment").await?;

        let outcome = match self.installments.settle(loan_id, &next.id, next.amount).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(loan_id, error = %e, "settlement failed after debit, reversing payment");

                if let Err(reversal) = self
                    .ledger
                    .credit(user_id, payable, "EMI Payment Reversal")
                    .await
                {
                    error!(
                        loan_id,
                        error = %reversal,
                        "failed to reverse EMI debit; wallet and loan state diverge"
                    );
                }

                return Err(e);
            }
        };

        info!(
            loan_id,
            installment = next.installment_number,
            paid = %payable,
            remaining = %outcome.remaining_amount,
            closed = outcome.loan_closed,
            "EMI paid"
        );

        self.notify(user_id, messages::loan_repayment(next.amount))
            .await;

        Ok(RepaymentReceipt {
            loan_id: loan_id.to_string(),
            installment_number: next.installment_number,
            amount_paid: payable,
            penalty_applied,
            remaining_amount: outcome.remaining_amount,
            loan_closed: outcome.loan_closed,
        })
    }

    /// Settle the whole balance early, with a 2% pre-closure fee
    pub async fn pre_close(&self, user_id: &str, loan_id: &str) -> Result<Loan> {
        let lock = self.lock_for(loan_id);
        let _guard = lock.lock().await;

        info!(user_id, loan_id, "pre-closure requested");

        let mut loan = self.find_loan(loan_id).await?;

        if loan.user_id != user_id {
            warn!(user_id, loan_id, "pre-closure attempt by non-owner");
            return Err(AppError::forbidden("Only the loan owner may pre-close"));
        }

        if loan.status != LoanStatus::Active {
            return Err(AppError::domain(format!("Loan {} is not active", loan_id)));
        }

        let remaining = loan.remaining_amount;
        let fee = (remaining * Decimal::new(2, 2)).round_dp(2);
        let total_payable = remaining + fee;

        self.ledger
            .debit(user_id, total_payable, "Loan Pre-closure")
            .await?;

        if let Err(e) = self.loans.close(loan_id).await {
            error!(loan_id, error = %e, "pre-closure failed after debit, reversing payment");

            if let Err(reversal) = self
                .ledger
                .credit(user_id, total_payable, "Loan Pre-closure Reversal")
                .await
            {
                error!(
                    loan_id,
                    error = %reversal,
                    "failed to reverse pre-closure debit; wallet and loan state diverge"
                );
            }

            return Err(e);
        }

        loan.pre_close()?;

        info!(loan_id, paid = %total_payable, "loan pre-closed");

        self.notify(user_id, messages::loan_pre_closed()).await;

        Ok(loan)
    }

    pub async fn get_user_loans(&self, user_id: &str) -> Result<Vec<Loan>> {
        self.loans.find_by_user(user_id).await
    }

    pub async fn get_all_loans(&self) -> Result<Vec<Loan>> {
        self.loans.list_all().await
    }

    /// Owner-checked installment schedule
    pub async fn get_emi_schedule(
        &self,
        user_id: &str,
        loan_id: &str,
    ) -> Result<Vec<LoanInstallment>> {
        let loan = self.find_loan(loan_id).await?;

        if loan.user_id != user_id {
            return Err(AppError::forbidden(
                "Only the loan owner may view the schedule",
            ));
        }

        self.installments.find_by_loan(loan_id).await
    }

    /// The user's pending installments already past their due date
    ///
    /// Pre-sweep view: an installment shows up here as soon as its due date
    /// passes, even before the sweep has flipped it to overdue.
    pub async fn get_overdue_emis(&self, user_id: &str) -> Result<Vec<LoanInstallment>> {
        let today = chrono::Utc::now().date_naive();
        let installments = self.installments.find_by_user(user_id).await?;

        Ok(installments
            .into_iter()
            .filter(|i| i.is_past_due(today))
            .collect())
    }

    /// Sum of remaining balances across all of a user's loans
    pub async fn total_outstanding(&self, user_id: &str) -> Result<Decimal> {
        let loans = self.loans.find_by_user(user_id).await?;
        Ok(loans.iter().map(|l| l.remaining_amount).sum())
    }

    pub async fn check_eligibility(&self, user_id: &str) -> Result<EligibilityReport> {
        self.credit.check_eligibility(user_id).await
    }

    pub async fn loan_recommendation(&self, user_id: &str) -> Result<LoanRecommendation> {
        self.credit.loan_recommendation(user_id).await
    }

    async fn find_loan(&self, loan_id: &str) -> Result<Loan> {
        self.loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", loan_id)))
    }

    fn lock_for(&self, loan_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .repayment_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(loan_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Fire-and-forget: a failed notification never fails the operation
    async fn notify(&self, user_id: &str, message: String) {
        if let Err(e) = self
            .notifications
            .notify(user_id, &message, messages::LOAN_CATEGORY)
            .await
        {
            warn!(user_id, error = %e, "failed to record notification");
        }
    }
}
