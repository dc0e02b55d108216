pub mod services;

pub use services::{EntryKind, LedgerEntry, LedgerGateway, MySqlLedgerGateway};
