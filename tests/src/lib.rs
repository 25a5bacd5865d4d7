//! # Option-Sync Test Suite
//!
//! Unified test crate driving full post views through the in-memory bus and
//! page source.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Shared setup: bus, page source, mounted view
//! └── integration/      # End-to-end flows
//!     ├── paging_flows.rs
//!     ├── feed_flows.rs
//!     └── view_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sync-tests
//!
//! # By category
//! cargo test -p sync-tests integration::feed_flows
//!
//! # Benchmarks
//! cargo bench -p sync-tests
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
