pub mod installment_repository;
pub mod loan_repository;

pub use installment_repository::{
    DueInstallment, InstallmentRepository, MySqlInstallmentRepository, SettlementOutcome,
};
pub use loan_repository::{LoanRepository, MySqlLoanRepository};
