//! # Integration Flows
//!
//! Cross-subsystem choreography over the shared bus:
//!
//! 1. **Chain sources → Time Index (1)**: cross-validated indexing and halting on disagreement
//! 2. **Assembler (4) → Ledger**: proof gossip, quorum and acceptance events
//! 3. **End to end**: ledger-derived start height, indexing, report submission

pub mod e2e;
pub mod report_flow;
pub mod time_index_flow;
