//! Factory for creating forge implementations based on configuration.

use crate::{
    Result,
    forge::{
        config::{Remote, RemoteConfig},
        github::Github,
        local::LocalRepo,
        manager::ForgeManager,
        traits::Forge,
    },
};

/// Factory for creating forge implementations.
pub struct ForgeFactory;

impl ForgeFactory {
    /// Create a ForgeManager instance based on the Remote configuration.
    pub async fn create(remote: &Remote) -> Result<ForgeManager> {
        let (forge, dry_run): (Box<dyn Forge>, bool) = match remote {
            Remote::Github(config) => {
                (Self::create_github(config).await?, config.dry_run)
            }
            Remote::Local { path, dry_run } => {
                (Box::new(LocalRepo::new(path)?), *dry_run)
            }
        };

        Ok(ForgeManager::new(forge, dry_run))
    }

    async fn create_github(config: &RemoteConfig) -> Result<Box<dyn Forge>> {
        Ok(Box::new(Github::new(config.clone()).await?))
    }
}
