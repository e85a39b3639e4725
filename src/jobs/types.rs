use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Category, Resolution};
use crate::workflow::{Command, Transition};

/// The registry operation a job carries out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobOperation {
    Create,
    Update,
    SubmitDeed,
    SubmitIncumbrance,
    ApproveDeed,
    RejectDeed,
    ApproveIncumbrance,
    RejectIncumbrance,
    Delete,
}

impl JobOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOperation::Create => "create",
            JobOperation::Update => "update",
            JobOperation::SubmitDeed => "submit-deed",
            JobOperation::SubmitIncumbrance => "submit-incumbrance",
            JobOperation::ApproveDeed => "approve-deed",
            JobOperation::RejectDeed => "reject-deed",
            JobOperation::ApproveIncumbrance => "approve-incumbrance",
            JobOperation::RejectIncumbrance => "reject-incumbrance",
            JobOperation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for JobOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Command> for JobOperation {
    fn from(command: &Command) -> Self {
        match command {
            Command::Create(_) => JobOperation::Create,
            Command::Update { .. } => JobOperation::Update,
            Command::SubmitDeed { .. } => JobOperation::SubmitDeed,
            Command::SubmitIncumbrance { .. } => JobOperation::SubmitIncumbrance,
            Command::Resolve {
                category,
                resolution,
                ..
            } => match (category, resolution) {
                (Category::Deed, Resolution::Approve) => JobOperation::ApproveDeed,
                (Category::Deed, Resolution::Reject) => JobOperation::RejectDeed,
                (Category::Incumbrance, Resolution::Approve) => JobOperation::ApproveIncumbrance,
                (Category::Incumbrance, Resolution::Reject) => JobOperation::RejectIncumbrance,
            },
            Command::Delete { .. } => JobOperation::Delete,
        }
    }
}

/// Returned as soon as a write is accepted onto the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: Uuid,
    pub record_id: String,
    pub operation: JobOperation,
    pub accepted_at: DateTime<Utc>,
    /// Identifier of the entry a submission created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobStatus {
    Queued,
    Running,
    /// `version` is the record's new version; absent for deletes
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u64>,
    },
    Failed {
        reason: String,
    },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }
}

/// A handle plus the write it stands for
#[derive(Debug, Clone)]
pub struct Job {
    pub handle: JobHandle,
    pub transition: Transition,
}
