//! Recorded post activity.

use anyhow::{Context, Result};
use option_sync::{OptionPatch, PostId, SyncConfig, UserId};
use serde::{Deserialize, Serialize};
use shared_bus::FeedFrame;
use shared_types::OptionsPageResponse;
use std::path::Path;

/// One REST page keyed by the cursor it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePage {
    /// Request cursor; `None` for the first page.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Server response.
    pub response: OptionsPageResponse,
}

/// Everything needed to replay one post view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Post to mount.
    pub post_id: PostId,
    /// Viewer; `None` for an anonymous viewer.
    #[serde(default)]
    pub current_user: Option<UserId>,
    /// View configuration. Defaults to `SyncConfig::from_env()`.
    #[serde(default)]
    pub config: Option<SyncConfig>,
    /// REST pages.
    #[serde(default)]
    pub pages: Vec<FixturePage>,
    /// Local edits applied after paging.
    #[serde(default)]
    pub optimistic: Vec<OptionPatch>,
    /// Push frames published after the local edits, in order.
    #[serde(default)]
    pub frames: Vec<FeedFrame>,
}

impl Fixture {
    /// Parse a fixture from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid fixture JSON")
    }

    /// Read and parse a fixture file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in fixture {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_fixture() {
        let fixture = Fixture::from_json(r#"{"postId": "p1"}"#).unwrap();
        assert_eq!(fixture.post_id, "p1");
        assert!(fixture.current_user.is_none());
        assert!(fixture.pages.is_empty());
        assert!(fixture.frames.is_empty());
    }

    #[test]
    fn test_bundled_fixture_parses() {
        let fixture = Fixture::from_json(include_str!("../fixtures/auction.json")).unwrap();
        assert_eq!(fixture.post_id, "auction-42");
        assert_eq!(fixture.pages.len(), 2);
        assert_eq!(fixture.pages[1].cursor.as_deref(), Some("page-2"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(Fixture::from_json("{").is_err());
    }
}
