//! New-project drafts and their validation.

use serde::Serialize;

use crate::error::CoreError;

pub const NAME_REQUIRED: &str = "Project name is required";

/// Unsaved form fields of the new-project row, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub project_name: String,
    pub description: String,
}

impl ProjectDraft {
    pub fn new(project_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            description: description.into(),
        }
    }

    /// Trim both fields and require a non-empty name.
    pub fn validate(&self) -> Result<NewProject, CoreError> {
        let project_name = self.project_name.trim();
        if project_name.is_empty() {
            return Err(CoreError::Validation(NAME_REQUIRED.to_string()));
        }
        Ok(NewProject {
            project_name: project_name.to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

/// A validated create request body. Only obtainable through
/// [`ProjectDraft::validate`], so the name is always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    project_name: String,
    description: String,
}

impl NewProject {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Trimmed description; empty when none was given.
    pub fn description(&self) -> &str {
        &self.description
    }
}
