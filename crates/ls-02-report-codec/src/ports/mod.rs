//! Ports for the Report Codec.

pub mod outbound;
