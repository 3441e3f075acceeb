//! Adapters implementing outbound ports.

pub mod ledger_start;
pub mod memory_ledger;

pub use ledger_start::LedgerStartHeight;
pub use memory_ledger::InMemoryLedger;
