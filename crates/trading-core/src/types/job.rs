//! Remote job identifiers and poll outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PerformanceReport;

/// Opaque identifier assigned by the remote backend at submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single status poll.
///
/// The status vocabulary (`pending`, `running`, `completed`, `failed`, ...) is
/// owned by the backend and passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteStatus {
    /// Only a status value is available.
    Status(String),
    /// Status plus whatever result and logs the job has produced so far.
    Detailed {
        status: String,
        result: Option<PerformanceReport>,
        log: Option<String>,
    },
}

impl RemoteStatus {
    pub fn status(&self) -> &str {
        match self {
            RemoteStatus::Status(status) => status,
            RemoteStatus::Detailed { status, .. } => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        assert_eq!(RemoteStatus::Status("running".into()).status(), "running");
        let detailed = RemoteStatus::Detailed {
            status: "completed".into(),
            result: None,
            log: Some("done".into()),
        };
        assert_eq!(detailed.status(), "completed");
    }

    #[test]
    fn test_job_id_is_transparent() {
        let id = JobId::new("a1b2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1b2\"");
        assert_eq!(id.to_string(), "a1b2");
    }
}
