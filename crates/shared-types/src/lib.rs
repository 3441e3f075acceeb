//! # Shared Types Crate
//!
//! This crate contains the domain entities that flow between the report
//! consensus subsystems: addresses, bundle and source identifiers, chain
//! observations and the `ProofOfReport` attestation.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Canonical Rendering**: Addresses, hashes and signatures always render as
//!   `0x`-prefixed lowercase hex so independently running nodes agree on bytes.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
