//! Unified interface for the platforms rcgate talks to: a GitHub repository
//! over the REST API, or a local clone on disk.
//!
//! Provides token-based authentication, tag lookups, workflow run queries and
//! release management through a common trait.

/// Configuration and authentication for forge platforms.
pub mod config;

/// Builds a [`manager::ForgeManager`] for the selected remote.
pub mod factory;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Local git2-backed repository, tags only.
pub mod local;

/// Dry-run aware wrapper around a forge implementation.
pub mod manager;

/// Request and response types shared by all forges.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
