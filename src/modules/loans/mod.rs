pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    InstallmentStatus, Loan, LoanInstallment, LoanStatus, RiskTier, VipTier,
};
pub use repositories::{
    InstallmentRepository, LoanRepository, MySqlInstallmentRepository, MySqlLoanRepository,
};
pub use services::{
    CreditService, EmiCalculator, LoanApplication, LoanDecision, LoanService, OverdueSweeper,
};
