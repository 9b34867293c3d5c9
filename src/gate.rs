//! Tag-ancestry verification: the deploy gate.
//!
//! A final release tag may only be deployed when a release-candidate tag
//! named `<release>-rc<N>` points at the same commit.
use log::*;

use crate::{
    Result,
    error::GateError,
    forge::manager::ForgeManager,
};

/// Release event filtering.
pub mod event;

/// RC tag pattern matching and numeric ordering.
pub mod rc_tag;

use rc_tag::RcPattern;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The release shares its commit with `rc_tag`; deployment may proceed.
    RcDerived {
        release_tag: String,
        rc_tag: String,
        sha: String,
    },
    /// No release candidate points at the release commit.
    NotRcDerived { release_tag: String, sha: String },
}

impl Verdict {
    pub fn is_rc_derived(&self) -> bool {
        matches!(self, Verdict::RcDerived { .. })
    }

    pub fn rc_tag(&self) -> Option<&str> {
        match self {
            Verdict::RcDerived { rc_tag, .. } => Some(rc_tag),
            Verdict::NotRcDerived { .. } => None,
        }
    }
}

/// Determine whether `release_tag` was promoted from a release candidate.
pub async fn verify_release(
    forge: &ForgeManager,
    release_tag: &str,
) -> Result<Verdict> {
    if release_tag.is_empty() {
        return Err(GateError::invalid_args("release tag must not be empty"));
    }

    let pattern = RcPattern::new(release_tag)?;

    let sha = forge
        .resolve_tag(release_tag)
        .await?
        .ok_or_else(|| GateError::TagNotFound(release_tag.to_string()))?;

    info!("release tag {release_tag} points at commit {sha}");

    let siblings = forge.tags_for_commit(&sha).await?;

    debug!("tags sharing commit {sha}: {:?}", siblings);

    let verdict = match pattern.highest(siblings.iter().map(String::as_str)) {
        Some(rc) => Verdict::RcDerived {
            release_tag: release_tag.to_string(),
            rc_tag: rc.name,
            sha,
        },
        None => Verdict::NotRcDerived {
            release_tag: release_tag.to_string(),
            sha,
        },
    };

    Ok(verdict)
}
