use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Authenticated principal issuing a command (an MSP identity on the ledger).
/// Passed explicitly into every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caller(String);

impl Caller {
    pub fn new(identity: impl Into<String>) -> Result<Self, WorkflowError> {
        let identity = identity.into();
        let trimmed = identity.trim();
        if trimmed.is_empty() {
            return Err(WorkflowError::validation("identity", "caller identity must not be empty"));
        }
        Ok(Caller(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
