use std::process::ExitCode;

use crate::{error::GateError, poller::WaitOutcome};

/// Process exit status of a gate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Deployment may proceed or the workflow concluded as expected.
    Success,
    /// The release is not RC-derived or the conclusion did not match.
    Mismatch,
    /// No workflow run appeared in time.
    NotFound,
    /// Missing or malformed arguments.
    InvalidArgs,
    /// The forge or local repository failed.
    PlatformError,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Mismatch => 1,
            ExitStatus::NotFound => 2,
            ExitStatus::InvalidArgs => 3,
            ExitStatus::PlatformError => 4,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

impl From<&WaitOutcome> for ExitStatus {
    fn from(outcome: &WaitOutcome) -> Self {
        match outcome {
            WaitOutcome::Matched { .. } => ExitStatus::Success,
            WaitOutcome::Mismatch { .. } => ExitStatus::Mismatch,
            WaitOutcome::NotFound { .. } => ExitStatus::NotFound,
        }
    }
}

impl From<&GateError> for ExitStatus {
    fn from(err: &GateError) -> Self {
        if err.is_invalid_input() {
            ExitStatus::InvalidArgs
        } else {
            ExitStatus::PlatformError
        }
    }
}
