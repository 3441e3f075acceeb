//! Ports (hexagonal architecture boundaries)

pub mod inbound;
pub mod outbound;

pub use inbound::TimeIndexApi;
pub use outbound::{ChainDataSource, StartHeightResolver, TimeIndexStore};
