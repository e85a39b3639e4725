// Registrar authority over pending-entry resolution

use crate::error::WorkflowError;
use crate::model::{Caller, Category, Resolution};

/// Identities allowed to approve or reject each category.
/// An empty list leaves that category open to any caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityPolicy {
    pub deed_registrars: Vec<String>,
    pub incumbrance_registrars: Vec<String>,
}

impl AuthorityPolicy {
    pub fn new(deed_registrars: Vec<String>, incumbrance_registrars: Vec<String>) -> Self {
        Self {
            deed_registrars,
            incumbrance_registrars,
        }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    fn registrars(&self, category: Category) -> &[String] {
        match category {
            Category::Deed => &self.deed_registrars,
            Category::Incumbrance => &self.incumbrance_registrars,
        }
    }

    pub fn authorize(
        &self,
        caller: &Caller,
        category: Category,
        resolution: Resolution,
    ) -> Result<(), WorkflowError> {
        let registrars = self.registrars(category);
        if registrars.is_empty() || registrars.iter().any(|r| r == caller.as_str()) {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied {
                caller: caller.to_string(),
                operation: format!("{resolution} {category} entries"),
            })
        }
    }
}
