//! Release-promotion gate.
//!
//! Ensures a final release tag is only deployed when it was promoted from a
//! release candidate (`<release>-rc<N>`) pointing at the same commit, and
//! provides the workflow-completion poller used to assert how CI reacted to a
//! release.
pub mod cli;
pub mod command;
pub mod error;
pub mod forge;
pub mod gate;
pub mod poller;

pub use error::{GateError, Result};

#[cfg(test)]
pub mod test_helpers;
