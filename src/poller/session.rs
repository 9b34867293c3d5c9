//! Poll session state machine.
//!
//! A session starts in [`PollState::Searching`], moves to
//! [`PollState::Watching`] once a run for the commit shows up, and ends in
//! [`PollState::Terminal`] when that run completes or in
//! [`PollState::Exhausted`] when the attempt budget runs out first.
use log::*;
use std::time::Duration;
use tokio::time::sleep;

use crate::{
    Result,
    forge::{
        manager::ForgeManager,
        request::{ListRunsRequest, WorkflowRun},
    },
};

/// Conclusion reported for a completed run that carries none.
pub const UNKNOWN_CONCLUSION: &str = "unknown";

#[derive(Debug, Clone)]
pub enum PollState {
    /// Looking for a run triggered by the commit.
    Searching { attempts: u32 },
    /// Waiting for the selected run to complete. Unbounded.
    Watching { run: WorkflowRun },
    Terminal { run: WorkflowRun, conclusion: String },
    /// No run appeared within the attempt budget.
    Exhausted { attempts: u32 },
}

impl PollState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PollState::Terminal { .. } | PollState::Exhausted { .. }
        )
    }
}

/// Pick the authoritative run for a commit: the most recently created one
/// among runs triggered by `commit` (and tagged with `test_id`, if given).
pub fn select_run(
    runs: Vec<WorkflowRun>,
    commit: &str,
    test_id: Option<&str>,
) -> Option<WorkflowRun> {
    runs.into_iter()
        .filter(|run| run.head_sha == commit)
        .filter(|run| match test_id {
            Some(id) => run.display_title.contains(id) || run.name.contains(id),
            None => true,
        })
        .max_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
        })
}

pub struct PollSession<'a> {
    forge: &'a ForgeManager,
    commit: String,
    workflow: String,
    test_id: Option<String>,
    poll_interval: Duration,
    max_attempts: u32,
    state: PollState,
}

impl<'a> PollSession<'a> {
    pub fn new(
        forge: &'a ForgeManager,
        commit: &str,
        workflow: &str,
        test_id: Option<&str>,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            forge,
            commit: commit.to_string(),
            workflow: workflow.to_string(),
            test_id: test_id.map(String::from),
            poll_interval,
            max_attempts,
            state: PollState::Searching { attempts: 0 },
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Drive the session until it reaches a final state.
    pub async fn run(mut self) -> Result<PollState> {
        while !self.state.is_finished() {
            self.step().await?;
        }

        Ok(self.state)
    }

    /// Perform one poll and transition. Finished sessions do not change.
    pub async fn step(&mut self) -> Result<()> {
        let next = match &self.state {
            PollState::Searching { attempts } => self.search(*attempts).await?,
            PollState::Watching { run } => self.watch(run.id).await?,
            PollState::Terminal { .. } | PollState::Exhausted { .. } => {
                return Ok(());
            }
        };

        self.state = next;

        Ok(())
    }

    async fn search(&self, attempts: u32) -> Result<PollState> {
        let attempt = attempts + 1;

        debug!(
            "checking for workflow runs... (attempt {attempt}/{})",
            self.max_attempts
        );

        let req = ListRunsRequest {
            workflow: self.workflow.clone(),
            head_sha: self.commit.clone(),
        };

        let runs = match self.forge.list_workflow_runs(req).await {
            Ok(runs) => runs,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!("attempt {attempt}: failed to list workflow runs: {err}");
                vec![]
            }
        };

        if let Some(run) =
            select_run(runs, &self.commit, self.test_id.as_deref())
        {
            match &self.test_id {
                Some(id) => info!(
                    "workflow triggered by commit {} with test id {id}!",
                    self.commit
                ),
                None => info!("workflow triggered by commit {}!", self.commit),
            }

            debug!(
                "workflow run: id: {}, name: {}, title: {}, status: {:?}",
                run.id, run.name, run.display_title, run.status
            );

            info!("watching workflow run #{} until completion", run.id);

            return Ok(PollState::Watching { run });
        }

        if attempt >= self.max_attempts {
            return Ok(PollState::Exhausted { attempts: attempt });
        }

        sleep(self.poll_interval).await;

        Ok(PollState::Searching { attempts: attempt })
    }

    async fn watch(&self, run_id: u64) -> Result<PollState> {
        let run = self.forge.get_workflow_run(run_id).await?;

        info!("run #{run_id} - status: {:?}", run.status);

        if run.is_completed() {
            let conclusion = run
                .conclusion
                .clone()
                .unwrap_or_else(|| UNKNOWN_CONCLUSION.to_string());

            return Ok(PollState::Terminal { run, conclusion });
        }

        sleep(self.poll_interval).await;

        Ok(PollState::Watching { run })
    }
}
