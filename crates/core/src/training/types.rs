use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a training job.
///
/// A category without a tracked job is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl TrainingState {
    /// Queued and running jobs block new jobs for the same category.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// Snapshot of one category's training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    pub category: String,
    pub state: TrainingState,
    pub months_trained: Option<usize>,
    pub error: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl TrainingJob {
    pub fn queued(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            state: TrainingState::Queued,
            months_trained: None,
            error: None,
            requested_at: Utc::now(),
        }
    }

    pub fn mark_running(&mut self) {
        self.state = TrainingState::Running;
    }

    pub fn mark_succeeded(&mut self, months_trained: usize) {
        self.state = TrainingState::Succeeded;
        self.months_trained = Some(months_trained);
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.state = TrainingState::Failed;
        self.error = Some(error.into());
    }
}

/// Answer to a training request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingTicket {
    pub category: String,
    pub accepted: bool,
    /// True when the request joined a job that was already queued or running.
    pub deduplicated: bool,
    pub state: TrainingState,
}
