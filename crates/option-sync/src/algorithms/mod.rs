//! Algorithms module for Option Sync
//!
//! Contains:
//! - Leader selection
//! - Ranking (display order)

pub mod ranking;

pub use ranking::{find_leader, rank};
