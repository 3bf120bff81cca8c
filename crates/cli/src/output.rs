//! Terminal rendering of the project list, the identity and notices.

use chrono::FixedOffset;
use pmtrack_core::identity::Identity;
use pmtrack_view::display::{format_ended, format_timestamp, RowView, StatusCell};
use pmtrack_view::notice::{Notice, NoticeLevel};
use pmtrack_view::state::ProjectsView;
use serde_json::{json, Value};

pub struct Printer {
    json: bool,
    offset: FixedOffset,
}

impl Printer {
    pub fn new(json: bool, offset: FixedOffset) -> Self {
        Self { json, offset }
    }

    pub fn identity(&self, identity: &Identity) {
        if self.json {
            println!("{}", json!(identity));
        } else {
            println!("{}", identity_line(identity));
        }
    }

    pub fn projects(&self, view: &ProjectsView) {
        if self.json {
            println!("{}", projects_json(view, &self.offset));
        } else {
            print!("{}", projects_table(view, &self.offset));
        }
    }

    pub fn message(&self, text: &str) {
        if self.json {
            println!("{}", json!({ "ok": true, "message": text }));
        } else {
            println!("{text}");
        }
    }

    /// Notices go to stderr so the list output stays machine-readable.
    pub fn notices(&self, notices: &[Notice]) {
        for notice in notices {
            if self.json {
                eprintln!("{}", json!(notice));
            } else {
                eprintln!("{}", notice_line(notice));
            }
        }
    }
}

pub fn identity_line(identity: &Identity) -> String {
    let mut line = format!(
        "{} <{}> (user {})",
        identity.display_name(),
        identity.email,
        identity.user_id
    );
    if identity.is_admin {
        line.push_str(" [admin]");
    }
    if !identity.can_update_data {
        line.push_str(" [read-only]");
    }
    line
}

pub fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("{tag}: {}", notice.message)
}

fn status_text(cell: StatusCell) -> String {
    match cell {
        StatusCell::Badge { status } => status.to_string(),
        StatusCell::Selector { selected } => format!("<{selected}>"),
    }
}

fn row_cells(row: &RowView<'_>, offset: &FixedOffset, with_owner: bool) -> Vec<String> {
    let mut cells = vec![
        row.project.id.to_string(),
        row.project.project_name.clone(),
        status_text(row.status),
    ];
    if with_owner {
        cells.push(row.owner.clone().unwrap_or_default());
    }
    cells.push(format_timestamp(&row.project.started_at, offset));
    cells.push(format_ended(row.project.ended_at.as_ref(), offset));
    cells
}

/// Count line followed by an aligned table. Admins get an owner column.
pub fn projects_table(view: &ProjectsView, offset: &FixedOffset) -> String {
    let with_owner = view.is_admin();
    let mut header = vec!["ID", "NAME", "STATUS"];
    if with_owner {
        header.push("OWNER");
    }
    header.extend(["STARTED", "ENDED"]);

    let rows: Vec<Vec<String>> = view
        .rows()
        .iter()
        .map(|row| row_cells(row, offset, with_owner))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("{}\n", view.count_label());
    if rows.is_empty() {
        return out;
    }

    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    for line in std::iter::once(&header).chain(&rows) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn projects_json(view: &ProjectsView, offset: &FixedOffset) -> Value {
    let items: Vec<Value> = view
        .rows()
        .iter()
        .map(|row| {
            json!({
                "id": row.project.id,
                "project_name": row.project.project_name,
                "description": row.project.description,
                "status": row.project.status,
                "status_cell": row.status,
                "owner": row.owner,
                "started_at": format_timestamp(&row.project.started_at, offset),
                "ended_at": format_ended(row.project.ended_at.as_ref(), offset),
            })
        })
        .collect();

    json!({
        "count": view.items().len(),
        "count_label": view.count_label(),
        "filters": view.filters(),
        "items": items,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pmtrack_client::api::ProjectList;
    use pmtrack_core::project::{Project, ProjectStatus};
    use pmtrack_view::state::ReloadOrdering;

    use super::*;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn loaded(identity: &Identity) -> ProjectsView {
        let mut view = ProjectsView::new(identity, ReloadOrdering::default());
        let ticket = view.begin_reload();
        view.apply_reload(
            ticket,
            Ok(ProjectList {
                items: vec![
                    Project {
                        id: 3,
                        project_name: "Launch".to_string(),
                        description: Some("v1".to_string()),
                        status: ProjectStatus::Completed,
                        user_id: 1,
                        user_first_name: "Test".to_string(),
                        user_last_name: "User".to_string(),
                        started_at: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
                        ended_at: Some(Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap()),
                    },
                    Project {
                        id: 12,
                        project_name: "Site".to_string(),
                        description: None,
                        status: ProjectStatus::Ongoing,
                        user_id: 1,
                        user_first_name: "Test".to_string(),
                        user_last_name: "User".to_string(),
                        started_at: Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap(),
                        ended_at: None,
                    },
                ],
            }),
        );
        view
    }

    #[test]
    fn admin_table_has_owner_column() {
        let table = projects_table(&loaded(&Identity::local_dev()), &offset());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "2 projects");
        assert!(lines[1].starts_with("ID  NAME    STATUS     OWNER"));
        let completed = "COMPLETED  Test User  2025-03-01 01:30 PM  2025-03-05 01:30 PM";
        assert!(lines[2].contains(completed));
        assert!(lines[3].ends_with("2025-03-02 01:30 PM  —"));
    }

    #[test]
    fn member_table_omits_owner() {
        let member = Identity {
            is_admin: false,
            ..Identity::local_dev()
        };
        let table = projects_table(&loaded(&member), &offset());
        assert!(!table.contains("OWNER"));
        assert!(!table.contains("Test User"));
    }

    #[test]
    fn empty_list_prints_only_count() {
        let mut view = ProjectsView::new(&Identity::local_dev(), ReloadOrdering::default());
        let ticket = view.begin_reload();
        view.apply_reload(ticket, Ok(ProjectList::default()));
        assert_eq!(projects_table(&view, &offset()), "0 projects\n");
    }

    #[test]
    fn json_output_formats_timestamps() {
        let value = projects_json(&loaded(&Identity::local_dev()), &offset());
        assert_eq!(value["count_label"], "2 projects");
        assert_eq!(value["items"][0]["status"], "COMPLETED");
        assert_eq!(value["items"][0]["status_cell"]["kind"], "badge");
        assert_eq!(value["items"][1]["ended_at"], "—");
        assert_eq!(value["filters"]["status"], "");
    }

    #[test]
    fn identity_line_marks_admin() {
        assert_eq!(
            identity_line(&Identity::local_dev()),
            "Test User <test.user@local.dev> (user 1) [admin]"
        );
    }

    #[test]
    fn notice_lines_are_tagged() {
        let warning = Notice::warning("Project name is required");
        assert_eq!(notice_line(&warning), "warning: Project name is required");
        let success = Notice::success("Project added");
        assert_eq!(notice_line(&success), "ok: Project added");
    }
}
