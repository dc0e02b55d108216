pub mod credit;
pub mod installment;
pub mod loan;

pub use credit::{
    base_interest_for, dynamic_interest_for, loan_limit_for, recommended_amount_for,
    risk_tier_for, vip_tier_for, EligibilityReport, LoanRecommendation, RiskTier, VipTier,
    BASE_CREDIT_SCORE, MAX_CREDIT_SCORE, MIN_CREDIT_SCORE,
};
pub use installment::{InstallmentStatus, LoanInstallment};
pub use loan::{Loan, LoanStatus, MAX_TENURE_MONTHS};
