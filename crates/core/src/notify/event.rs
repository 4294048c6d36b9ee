use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle identifying a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(Uuid);

impl ObserverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Event pushed to observers.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"training_completed","category":"Books","months_trained":12}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// Sales data changed; clients should refetch.
    DataUpdated,
    TrainingStarted {
        category: String,
    },
    TrainingCompleted {
        category: String,
        months_trained: usize,
    },
    TrainingFailed {
        category: String,
        error: String,
    },
    /// Personal greeting sent to a freshly registered observer.
    Connected {
        observer_id: ObserverId,
    },
}

impl NotificationEvent {
    /// The `type` tag as it appears on the wire.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DataUpdated => "data_updated",
            Self::TrainingStarted { .. } => "training_started",
            Self::TrainingCompleted { .. } => "training_completed",
            Self::TrainingFailed { .. } => "training_failed",
            Self::Connected { .. } => "connected",
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::TrainingStarted { category }
            | Self::TrainingCompleted { category, .. }
            | Self::TrainingFailed { category, .. } => Some(category),
            Self::DataUpdated | Self::Connected { .. } => None,
        }
    }

    /// True for the events that end a training job.
    pub fn is_training_terminal(&self) -> bool {
        matches!(
            self,
            Self::TrainingCompleted { .. } | Self::TrainingFailed { .. }
        )
    }
}

/// An "underlying data changed" signal. Carries no row information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSignal {
    /// Where the signal came from, for logging only.
    pub origin: &'static str,
}

impl ChangeSignal {
    pub fn new(origin: &'static str) -> Self {
        Self { origin }
    }
}
