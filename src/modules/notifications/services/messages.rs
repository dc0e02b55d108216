//! Loan notification message catalogue

use rust_decimal::Decimal;

pub const LOAN_CATEGORY: &str = "LOAN";

pub fn loan_applied(amount: Decimal) -> String {
    format!("Your loan application for {} has been received.", amount)
}

pub fn loan_approved() -> String {
    "Your loan has been approved and disbursed to your wallet.".to_string()
}

pub fn loan_rejected() -> String {
    "Your loan application has been rejected.".to_string()
}

pub fn loan_repayment(amount: Decimal) -> String {
    format!("Your EMI payment of {} was successful.", amount)
}

pub fn loan_overdue() -> String {
    "Your EMI is overdue. Please pay immediately.".to_string()
}

pub fn loan_pre_closed() -> String {
    "Your loan has been pre-closed successfully.".to_string()
}
