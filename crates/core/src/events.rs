//! The closed vocabulary of deliverable event types.
//!
//! Producers emit one of these and nothing else; extending the set means
//! adding a variant here and updating the producer call sites. The wire
//! form is the dot-separated name (e.g. `"task.completed"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A deliverable platform event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "task.created")]
    TaskCreated,
    #[serde(rename = "task.started")]
    TaskStarted,
    #[serde(rename = "task.completed")]
    TaskCompleted,
    #[serde(rename = "task.failed")]
    TaskFailed,
    #[serde(rename = "task.cancelled")]
    TaskCancelled,
    #[serde(rename = "step.started")]
    StepStarted,
    #[serde(rename = "step.completed")]
    StepCompleted,
    #[serde(rename = "step.failed")]
    StepFailed,
    #[serde(rename = "file.created")]
    FileCreated,
    #[serde(rename = "file.updated")]
    FileUpdated,
    #[serde(rename = "session.created")]
    SessionCreated,
    #[serde(rename = "session.completed")]
    SessionCompleted,
    #[serde(rename = "session.failed")]
    SessionFailed,
    #[serde(rename = "message.created")]
    MessageCreated,
}

/// Every known event type, in declaration order.
pub const ALL_EVENT_TYPES: &[EventType] = &[
    EventType::TaskCreated,
    EventType::TaskStarted,
    EventType::TaskCompleted,
    EventType::TaskFailed,
    EventType::TaskCancelled,
    EventType::StepStarted,
    EventType::StepCompleted,
    EventType::StepFailed,
    EventType::FileCreated,
    EventType::FileUpdated,
    EventType::SessionCreated,
    EventType::SessionCompleted,
    EventType::SessionFailed,
    EventType::MessageCreated,
];

impl EventType {
    /// The dot-separated wire name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TaskCreated => "task.created",
            EventType::TaskStarted => "task.started",
            EventType::TaskCompleted => "task.completed",
            EventType::TaskFailed => "task.failed",
            EventType::TaskCancelled => "task.cancelled",
            EventType::StepStarted => "step.started",
            EventType::StepCompleted => "step.completed",
            EventType::StepFailed => "step.failed",
            EventType::FileCreated => "file.created",
            EventType::FileUpdated => "file.updated",
            EventType::SessionCreated => "session.created",
            EventType::SessionCompleted => "session.completed",
            EventType::SessionFailed => "session.failed",
            EventType::MessageCreated => "message.created",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_EVENT_TYPES
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("Unknown event type: {s}")))
    }
}
