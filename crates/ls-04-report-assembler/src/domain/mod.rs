//! Domain layer: bundles, usage, report construction and proof collection.

pub mod builder;
pub mod bundle;
pub mod outcome;
pub mod pool;
pub mod usage;

pub use builder::{FeeConfig, ReportBuilder};
pub use bundle::{Bundle, HeightWindow};
pub use outcome::Outcome;
pub use pool::ProofPool;
pub use usage::UsageAggregates;
