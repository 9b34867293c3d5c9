//! Configuration for forge platform connections.
use secrecy::SecretString;
use std::path::PathBuf;

/// Default page size for paginated REST queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// Remote repository connection configuration for authenticating and
/// interacting with forge platforms.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Full repository path.
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Log mutating operations instead of performing them.
    pub dry_run: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
            dry_run: false,
        }
    }
}

impl RemoteConfig {
    /// REST API base for the configured host. GitHub.com serves its API from
    /// `api.github.com`, Enterprise Server from `/api/v3` on the same host.
    pub fn api_base_uri(&self) -> String {
        if self.host == "github.com" {
            format!("{}://api.{}", self.scheme, self.host)
        } else {
            format!("{}://{}/api/v3", self.scheme, self.host)
        }
    }
}

#[derive(Debug, Clone)]
/// Supported forge platforms.
pub enum Remote {
    Github(RemoteConfig),
    Local { path: PathBuf, dry_run: bool },
}
