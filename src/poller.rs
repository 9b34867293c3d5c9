//! Workflow-completion polling.
//!
//! Waits for the CI run triggered by a commit and asserts its conclusion.
//! Discovery is bounded by `timeout / poll_interval` attempts; once a run is
//! found it is watched until it completes, with no further deadline.
use log::*;
use std::{str::FromStr, time::Duration};
use strum::VariantNames;
use tokio::time::sleep;

use crate::{Result, error::GateError, forge::manager::ForgeManager};

/// Fixed enumeration of run conclusions.
pub mod conclusion;

/// Searching / Watching / Terminal state machine.
pub mod session;

use conclusion::Conclusion;
use session::{PollSession, PollState};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Everything one poll invocation needs. Nothing is read from the process
/// environment.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub commit: String,
    /// Workflow display name or file name.
    pub workflow: String,
    /// Raw expected conclusion, validated against [`Conclusion`].
    pub expected: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Only consider runs whose title or name contains this id.
    pub test_id: Option<String>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            commit: "".into(),
            workflow: "".into(),
            expected: "".into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            test_id: None,
        }
    }
}

impl WaitOptions {
    /// Check arguments without touching the forge and return the parsed
    /// expected conclusion.
    pub fn validate(&self) -> Result<Conclusion> {
        if self.commit.trim().is_empty() {
            return Err(GateError::invalid_args("commit must not be empty"));
        }

        if self.workflow.trim().is_empty() {
            return Err(GateError::invalid_args("workflow must not be empty"));
        }

        let expected = Conclusion::from_str(&self.expected).map_err(|_| {
            GateError::invalid_args(format!(
                "expected conclusion '{}' is not one of: {}",
                self.expected,
                Conclusion::VARIANTS.join(", ")
            ))
        })?;

        if self.poll_interval.is_zero() {
            return Err(GateError::invalid_args(
                "poll interval must be positive",
            ));
        }

        if self.timeout < self.poll_interval {
            return Err(GateError::invalid_args(format!(
                "timeout ({}s) must be at least one poll interval ({}s)",
                self.timeout.as_secs_f64(),
                self.poll_interval.as_secs_f64()
            )));
        }

        Ok(expected)
    }

    /// Number of discovery attempts: `floor(timeout / poll_interval)`.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.poll_interval.as_millis().max(1);
        let attempts = self.timeout.as_millis() / interval;
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a finished wait did not succeed. Invalid arguments are returned as
/// errors instead.
pub enum FailureKind {
    NotFound,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The run concluded as expected.
    Matched { run_id: u64, conclusion: String },
    /// The run concluded differently from what was expected.
    Mismatch {
        run_id: u64,
        expected: Conclusion,
        observed: String,
    },
    /// No run for the commit appeared within the attempt budget.
    NotFound { attempts: u32 },
}

impl WaitOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, WaitOutcome::Matched { .. })
    }

    pub fn observed_conclusion(&self) -> Option<&str> {
        match self {
            WaitOutcome::Matched { conclusion, .. } => Some(conclusion),
            WaitOutcome::Mismatch { observed, .. } => Some(observed),
            WaitOutcome::NotFound { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            WaitOutcome::Matched { .. } => None,
            WaitOutcome::Mismatch { .. } => Some(FailureKind::Mismatch),
            WaitOutcome::NotFound { .. } => Some(FailureKind::NotFound),
        }
    }
}

/// Wait for the run of `options.workflow` triggered by `options.commit` and
/// compare its conclusion with `options.expected`.
///
/// Invalid arguments are rejected before any forge call. Platform errors
/// while listing runs are retried as part of discovery; errors while watching
/// a found run are returned.
pub async fn await_conclusion(
    forge: &ForgeManager,
    options: &WaitOptions,
) -> Result<WaitOutcome> {
    let expected = options.validate()?;
    let max_attempts = options.max_attempts();

    debug!("starting workflow monitoring:");
    debug!("  commit sha: {}", options.commit);
    debug!("  workflow: {}", options.workflow);
    if let Some(test_id) = &options.test_id {
        debug!("  test id: {test_id}");
    }
    debug!("  expected conclusion: {expected}");
    debug!("  timeout: {}s", options.timeout.as_secs_f64());
    debug!("  poll interval: {}s", options.poll_interval.as_secs_f64());

    // runs triggered by the same push may not all be listed straight away
    sleep(options.poll_interval).await;

    info!(
        "waiting for workflow to start (up to {} attempts over {}s)...",
        max_attempts,
        options.timeout.as_secs_f64()
    );

    let session = PollSession::new(
        forge,
        &options.commit,
        &options.workflow,
        options.test_id.as_deref(),
        options.poll_interval,
        max_attempts,
    );

    let outcome = match session.run().await? {
        PollState::Terminal { run, conclusion } => {
            info!("workflow concluded with: {conclusion}");
            info!("expected conclusion: {expected}");

            if expected.matches(&conclusion) {
                WaitOutcome::Matched {
                    run_id: run.id,
                    conclusion,
                }
            } else {
                WaitOutcome::Mismatch {
                    run_id: run.id,
                    expected,
                    observed: conclusion,
                }
            }
        }
        PollState::Exhausted { attempts } => {
            WaitOutcome::NotFound { attempts }
        }
        state => {
            return Err(GateError::forge(format!(
                "poll session stopped in unfinished state: {state:?}"
            )));
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests;
