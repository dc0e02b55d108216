pub mod credit_service;
pub mod emi_calculator;
pub mod loan_service;
pub mod overdue_sweeper;

pub use credit_service::CreditService;
pub use emi_calculator::EmiCalculator;
pub use loan_service::{
    LoanApplication, LoanDecision, LoanService, RepaymentReceipt, OVERDUE_PENALTY,
};
pub use overdue_sweeper::{OverdueSweeper, SweepSummary};
