pub mod ledger_gateway;
pub mod mysql_ledger;

pub use ledger_gateway::{EntryKind, LedgerEntry, LedgerGateway};
pub use mysql_ledger::MySqlLedgerGateway;
