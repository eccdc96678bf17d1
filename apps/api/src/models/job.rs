use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::brand_voice::BrandVoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "succeeded" => Some(JobStatus::Succeeded),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Durable record of a background brand-voice generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: Uuid,
    pub user_id: String,
    pub status: JobStatus,
    pub result: Option<BrandVoice>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start(&mut self) {
        self.transition(JobStatus::Running);
    }

    pub fn succeed(&mut self, voice: BrandVoice) {
        self.result = Some(voice);
        self.error = None;
        self.transition(JobStatus::Succeeded);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.result = None;
        self.error = Some(error.into());
        self.transition(JobStatus::Failed);
    }

    fn transition(&mut self, status: JobStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::brand_voice::fixtures::voice;

    #[test]
    fn test_status_strings_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Succeeded,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("done"), None);
    }

    #[test]
    fn test_lifecycle() {
        let mut job = GenerationJob::new("user-1");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(!job.status.is_terminal());

        job.start();
        assert_eq!(job.status, JobStatus::Running);

        job.succeed(voice());
        assert!(job.status.is_terminal());
        assert!(job.result.is_some());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_failure_clears_result() {
        let mut job = GenerationJob::new("user-1");
        job.fail("upstream unavailable");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("upstream unavailable"));
        assert!(job.result.is_none());
    }
}
