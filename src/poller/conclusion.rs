use strum::{AsRefStr, Display, EnumString, VariantNames};

/// Terminal outcome of a CI workflow run, spelled the way the GitHub API
/// reports it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Skipped,
    Cancelled,
    StartupFailure,
    TimedOut,
    ActionRequired,
    Neutral,
}

impl Conclusion {
    /// Case-sensitive comparison against a conclusion observed on a run.
    pub fn matches(&self, observed: &str) -> bool {
        self.as_ref() == observed
    }
}
