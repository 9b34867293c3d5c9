//! Release event filtering for the deploy gate.
//!
//! The gate is attached to GitHub's `release` event. Only the publication of
//! a final (non-draft, non-prerelease) release should reach verification;
//! anything else is filtered out as if the job never ran.
use log::*;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::Result;

const PUBLISHED_ACTION: &str = "published";

#[derive(Debug, Clone, Deserialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub release: Option<ReleasePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    /// Verify the given release tag.
    Verify { tag: String },
    /// The event does not describe a published final release.
    Filtered { reason: String },
    /// The payload carries no release; the caller must name the tag.
    NoRelease,
}

impl EventPayload {
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("loading event payload from {}", path.display());
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn decision(&self) -> EventDecision {
        let Some(release) = &self.release else {
            return EventDecision::NoRelease;
        };

        let action = self.action.as_deref().unwrap_or_default();

        if action != PUBLISHED_ACTION {
            return EventDecision::Filtered {
                reason: format!(
                    "release {} event action is '{action}', not '{PUBLISHED_ACTION}'",
                    release.tag_name
                ),
            };
        }

        if release.draft {
            return EventDecision::Filtered {
                reason: format!("release {} is a draft", release.tag_name),
            };
        }

        if release.prerelease {
            return EventDecision::Filtered {
                reason: format!(
                    "release {} is a prerelease",
                    release.tag_name
                ),
            };
        }

        EventDecision::Verify {
            tag: release.tag_name.clone(),
        }
    }
}
