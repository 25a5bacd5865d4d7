//! # Shared Types Crate
//!
//! Identifiers, option records and feed payloads shared across the
//! workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: wire shapes for pages and push frames are
//!   defined here and nowhere else.
//! - **Partial Records**: every producer (page, delta, optimistic edit) speaks
//!   `OptionPatch`; only the option store turns patches into full records.
//! - **camelCase on the wire**: payloads mirror what the platform backend emits.

pub mod entities;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
