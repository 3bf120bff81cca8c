//! List filter selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::project::ProjectStatus;

/// Status criterion of the list query. `Any` travels as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    #[serde(rename = "")]
    Any,
    #[serde(rename = "ONGOING")]
    Ongoing,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Any => "",
            StatusFilter::Ongoing => "ONGOING",
            StatusFilter::Completed => "COMPLETED",
        }
    }
}

impl From<ProjectStatus> for StatusFilter {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Ongoing => StatusFilter::Ongoing,
            ProjectStatus::Completed => StatusFilter::Completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::Any);
        }
        s.parse::<ProjectStatus>().map(StatusFilter::from)
    }
}

/// Filter criteria sent with every list request.
///
/// `user_id` is a string because it comes straight from a selector whose
/// "all users" entry is the empty string. The server honours it only for
/// admins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub status: StatusFilter,
    pub user_id: String,
}

impl FilterSelection {
    pub fn new(status: StatusFilter, user_id: impl Into<String>) -> Self {
        Self {
            status,
            user_id: user_id.into(),
        }
    }

    /// The selection as it may be sent for a caller with the given
    /// capability: non-admins never send a user criterion.
    pub fn scoped_to(&self, is_admin: bool) -> FilterSelection {
        if is_admin {
            self.clone()
        } else {
            FilterSelection {
                status: self.status,
                user_id: String::new(),
            }
        }
    }
}
