//! Values derived from the view state for rendering: row cells, the item
//! count label and timestamp text.

use chrono::FixedOffset;
use pmtrack_core::project::{Project, ProjectStatus};
use pmtrack_core::types::Timestamp;
use serde::Serialize;

use crate::state::{ProjectsView, RowMode};

/// Text shown for a timestamp that is not set.
pub const MISSING_TIMESTAMP: &str = "—";

/// The status column of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatusCell {
    /// Read-only status.
    Badge { status: ProjectStatus },
    /// The row being edited, with the currently chosen value.
    Selector { selected: ProjectStatus },
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView<'a> {
    pub project: &'a Project,
    /// Owner column, admins only.
    pub owner: Option<String>,
    pub status: StatusCell,
}

/// `"Loading..."` while a list fetch is outstanding, otherwise the count.
pub fn count_label(loading: bool, count: usize) -> String {
    if loading {
        return "Loading...".to_string();
    }
    match count {
        1 => "1 project".to_string(),
        n => format!("{n} projects"),
    }
}

/// Render as `YYYY-MM-DD hh:mm AM/PM` in the given offset.
pub fn format_timestamp(ts: &Timestamp, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%Y-%m-%d %I:%M %p").to_string()
}

pub fn format_ended(ts: Option<&Timestamp>, offset: &FixedOffset) -> String {
    ts.map(|ts| format_timestamp(ts, offset))
        .unwrap_or_else(|| MISSING_TIMESTAMP.to_string())
}

impl ProjectsView {
    /// Rows in server order. Only the row under edit gets a selector.
    pub fn rows(&self) -> Vec<RowView<'_>> {
        let editing = match self.mode() {
            RowMode::Editing { id, status } => Some((*id, *status)),
            _ => None,
        };

        self.items()
            .iter()
            .map(|project| {
                let status = match editing {
                    Some((id, selected)) if id == project.id => StatusCell::Selector { selected },
                    _ => StatusCell::Badge {
                        status: project.status,
                    },
                };
                RowView {
                    project,
                    owner: self.is_admin().then(|| project.owner_name()),
                    status,
                }
            })
            .collect()
    }

    pub fn count_label(&self) -> String {
        count_label(self.loading(), self.items().len())
    }
}
