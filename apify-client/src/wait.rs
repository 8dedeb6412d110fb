//! Waiting for actor jobs (runs and builds) to finish.

use apify_http_client::{HttpClientError, QueryParams, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::resource::ResourceContext;

/// Delay before re-polling a job the API did not return yet.
pub const JOB_NOT_FOUND_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Status of a run or build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ActorJobStatus {
    /// Created, waiting for resources.
    Ready,
    /// Executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Being stopped after exceeding its timeout.
    TimingOut,
    /// Stopped after exceeding its timeout.
    TimedOut,
    /// Being aborted.
    Aborting,
    /// Aborted.
    Aborted,
}

impl ActorJobStatus {
    /// Statuses after which a job never changes again.
    pub const TERMINAL: [ActorJobStatus; 4] =
        [Self::Succeeded, Self::Failed, Self::TimedOut, Self::Aborted];

    /// Check if the job can no longer change.
    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimingOut => "TIMING-OUT",
            Self::TimedOut => "TIMED-OUT",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
        }
    }

    /// Read the status of a job object.
    pub fn of(job: &Value) -> Option<Self> {
        job.get("status")
            .cloned()
            .and_then(|status| serde_json::from_value(status).ok())
    }
}

impl std::fmt::Display for ActorJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Poll a job until it reaches a terminal status or `wait_secs` elapse.
///
/// Each poll asks the API to hold the answer for the remaining budget. The
/// last observed job is returned even if it is still running; a job that was
/// never observed is an error.
pub(crate) async fn wait_for_finish(
    context: &ResourceContext,
    wait_secs: Option<u64>,
) -> Result<Value> {
    let budget = Duration::from_secs(wait_secs.unwrap_or(context.max_wait_for_finish_secs()));
    let started = Instant::now();
    let mut job: Option<Value> = None;

    loop {
        let remaining = budget.saturating_sub(started.elapsed());
        let wait_for_finish = (remaining.as_millis() as f64 / 1000.0).round() as u64;
        let params = QueryParams::new().with("waitForFinish", wait_for_finish);

        let fetched = context.get_resource("waitForFinish", &params).await?;
        let found = fetched.is_some();
        if fetched.is_some() {
            job = fetched;
        }

        let status = job.as_ref().and_then(ActorJobStatus::of);
        if status.is_some_and(|status| status.is_terminal()) || started.elapsed() >= budget {
            break;
        }

        if !found {
            debug!(url = %context.url(), "Job not found yet, polling again");
            tokio::time::sleep(JOB_NOT_FOUND_RETRY_DELAY).await;
        }
    }

    job.ok_or_else(|| {
        HttpClientError::UnexpectedResponse(
            "Waiting for job to finish failed. Cannot fetch actor job details from the server."
                .to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_statuses() {
        assert!(ActorJobStatus::Succeeded.is_terminal());
        assert!(ActorJobStatus::TimedOut.is_terminal());
        assert!(!ActorJobStatus::TimingOut.is_terminal());
        assert!(!ActorJobStatus::Running.is_terminal());
    }

    #[test]
    fn test_status_of_job() {
        assert_eq!(
            ActorJobStatus::of(&json!({ "status": "TIMED-OUT" })),
            Some(ActorJobStatus::TimedOut)
        );
        assert_eq!(ActorJobStatus::of(&json!({ "status": "WEIRD" })), None);
        assert_eq!(ActorJobStatus::of(&json!({})), None);
        assert_eq!(ActorJobStatus::Aborting.to_string(), "ABORTING");
    }
}
