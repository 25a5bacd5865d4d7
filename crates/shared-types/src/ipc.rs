//! # Feed Payloads
//!
//! Payload types carried by push frames and page responses.
//!
//! ## Frame Events
//!
//! | Event | Payload |
//! |-------|---------|
//! | `option_upsert` | `OptionUpsertPayload` |
//! | `option_deleted` | `OptionDeletedPayload` |

use crate::entities::{OptionId, OptionPatch, PostId};
use serde::{Deserialize, Serialize};

/// Event name for created-or-updated options.
pub const OPTION_UPSERT_EVENT: &str = "option_upsert";

/// Event name for deleted options.
pub const OPTION_DELETED_EVENT: &str = "option_deleted";

/// Payload of an `option_upsert` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionUpsertPayload {
    /// Post the option belongs to.
    pub post_id: PostId,
    /// Changed fields.
    pub option: OptionPatch,
}

/// Payload of an `option_deleted` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDeletedPayload {
    /// Post the option belonged to.
    pub post_id: PostId,
    /// Removed option.
    pub option_id: OptionId,
}

/// One page of options as returned by the REST transport.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPageResponse {
    /// Options on this page.
    #[serde(default)]
    pub options: Vec<OptionPatch>,
    /// Cursor for the next page. `None` or empty means no further pages.
    #[serde(default)]
    pub next_cursor: Option<String>,
}
