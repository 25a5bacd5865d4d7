//! # Outbound Ports
//!
//! The REST page transport. The push transport is `shared_bus::EventSubscriber`.

use async_trait::async_trait;
use shared_types::{OptionsPageResponse, TransportError};

/// Paginated option listing - outbound port.
///
/// Injected at construction; there is no global client.
#[async_trait]
pub trait OptionPageSource: Send + Sync {
    /// Fetch one page of options for `post_id`.
    ///
    /// `cursor` is `None` for the first page. The server returns at most
    /// `limit` options.
    async fn fetch_options_page(
        &self,
        post_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<OptionsPageResponse, TransportError>;
}
