//! # Domain Module
//!
//! Core domain types for option synchronization.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod store;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use store::*;
pub use value_objects::*;
