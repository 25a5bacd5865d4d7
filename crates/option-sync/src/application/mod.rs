//! # Application Module
//!
//! Services orchestrating the domain and the transport ports.

pub mod page_fetcher;
pub mod reconciler;
pub mod view;

pub use page_fetcher::PageFetcher;
pub use reconciler::Reconciler;
pub use view::{PostView, PostViewHandle};
