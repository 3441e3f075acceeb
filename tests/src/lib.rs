//! # Report Consensus Test Suite
//!
//! Unified test crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/            # Criterion benchmarks (hashing, lookups, builder)
//! └── src/
//!     ├── fixtures.rs     # Shared mocks: chain sources, usage, clocks, reporter sets
//!     └── integration/    # Cross-subsystem flows over the shared bus
//!         ├── time_index_flow.rs
//!         ├── report_flow.rs
//!         └── e2e.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ls-tests
//!
//! # By flow
//! cargo test -p ls-tests integration::report_flow::
//!
//! # Benchmarks
//! cargo bench -p ls-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
