//! RevPay Loan & Ledger Engine
//!
//! Digital-wallet micro-lending backend: EMI schedules, credit scoring,
//! risk and VIP tiering, loan lifecycle management, and overdue detection,
//! with wallet balances mutated only through the ledger gateway.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::loans;
pub use modules::notifications;
pub use modules::users;
pub use modules::wallets;
