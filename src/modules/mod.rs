pub mod loans;
pub mod notifications;
pub mod users;
pub mod wallets;
