//! # Ports Module
//!
//! Hexagonal architecture ports (inbound view API, outbound page transport).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
