//! Ports for the Report Assembler.

pub mod inbound;
pub mod outbound;
