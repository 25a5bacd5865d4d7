//! # Integration Flows
//!
//! Full post views driven through `InMemoryEventBus` and
//! `InMemoryPageSource`.

pub mod feed_flows;
pub mod paging_flows;
pub mod view_flows;
