//! The project list state machine.
//!
//! One row-level interaction at a time: [`RowMode::Idle`],
//! [`RowMode::Adding`] (a single draft row) or [`RowMode::Editing`] (one
//! row's status selector). Writes never patch the local list; a successful
//! write hands back a [`ReloadTicket`] and the list is replaced wholesale
//! when that reload lands.
//!
//! The machine does no I/O. Operations that need the network return what
//! to send (a ticket, a validated project, a pending update) and a matching
//! `apply_*`/`finish_*` call takes the result.

use std::str::FromStr;

use pmtrack_client::api::{ProjectList, WriteAck};
use pmtrack_client::outcome::ApiOutcome;
use pmtrack_core::draft::{NewProject, ProjectDraft};
use pmtrack_core::error::CoreError;
use pmtrack_core::filter::{FilterSelection, StatusFilter};
use pmtrack_core::identity::Identity;
use pmtrack_core::project::{Project, ProjectStatus};
use pmtrack_core::types::DbId;
use pmtrack_core::users::{user_filter_options, UserOption};

use crate::notice::Notice;

const LOAD_FAILED: &str = "Failed to load projects";
const CREATE_FAILED: &str = "Failed to create project";
const UPDATE_FAILED: &str = "Failed to update status";

/// Which list response wins when reloads overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadOrdering {
    /// Every response is applied as it arrives, so the last one to arrive
    /// wins even if an older request was issued after it.
    #[default]
    LastArrivalWins,
    /// Responses to anything but the most recently issued reload are
    /// discarded.
    LatestIssuedWins,
}

impl FromStr for ReloadOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-arrival" => Ok(ReloadOrdering::LastArrivalWins),
            "latest-issued" => Ok(ReloadOrdering::LatestIssuedWins),
            other => Err(format!(
                "unknown reload ordering {other:?} (expected last-arrival or latest-issued)"
            )),
        }
    }
}

/// A list request the caller must perform and feed back through
/// [`ProjectsView::apply_reload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    seq: u64,
    filters: FilterSelection,
}

impl ReloadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Filters to send, already scoped to the caller's capability.
    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }
}

/// What a finished reload did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadApplied {
    Replaced { count: usize },
    Failed,
    /// Superseded by a later reload under [`ReloadOrdering::LatestIssuedWins`].
    Discarded,
}

/// Row-level interaction state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowMode {
    #[default]
    Idle,
    Adding {
        draft: ProjectDraft,
    },
    Editing {
        id: DbId,
        status: ProjectStatus,
    },
}

impl RowMode {
    fn name(&self) -> &'static str {
        match self {
            RowMode::Idle => "idle",
            RowMode::Adding { .. } => "adding",
            RowMode::Editing { .. } => "editing",
        }
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// Rejected locally; a warning was queued and nothing should be sent.
    Blocked,
    /// Send this to the server.
    Ready(T),
}

/// A status change to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpdate {
    pub id: DbId,
    pub status: ProjectStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Cannot {action} while {mode}")]
    InvalidTransition {
        action: &'static str,
        mode: &'static str,
    },

    #[error("Filtering by user is only available to admins")]
    AdminOnly,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// In-memory state of the project list view.
#[derive(Debug, Clone)]
pub struct ProjectsView {
    is_admin: bool,
    items: Vec<Project>,
    loading: bool,
    filters: FilterSelection,
    mode: RowMode,
    notices: Vec<Notice>,
    ordering: ReloadOrdering,
    issued_seq: u64,
}

impl ProjectsView {
    pub fn new(identity: &Identity, ordering: ReloadOrdering) -> Self {
        Self {
            is_admin: identity.is_admin,
            items: Vec::new(),
            loading: true,
            filters: FilterSelection::default(),
            mode: RowMode::Idle,
            notices: Vec::new(),
            ordering,
            issued_seq: 0,
        }
    }

    /// Start from a given filter selection instead of the empty one.
    pub fn with_filters(mut self, filters: FilterSelection) -> Self {
        self.filters = filters;
        self
    }

    // ---- accessors ----

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn items(&self) -> &[Project] {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn mode(&self) -> &RowMode {
        &self.mode
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Admin user selector entries, derived from the loaded page. Empty for
    /// non-admins.
    pub fn user_filter_options(&self) -> Vec<UserOption> {
        if !self.is_admin {
            return Vec::new();
        }
        user_filter_options(&self.items)
    }

    // ---- loading and filters ----

    /// Issue a full reload with the current filters.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.issued_seq += 1;
        self.loading = true;
        let ticket = ReloadTicket {
            seq: self.issued_seq,
            filters: self.filters.scoped_to(self.is_admin),
        };
        tracing::debug!(
            seq = ticket.seq,
            status = %ticket.filters.status,
            user_id = %ticket.filters.user_id,
            "Reload issued",
        );
        ticket
    }

    /// Feed back the outcome of a reload. Success replaces the list;
    /// failure leaves it untouched and queues an error notice.
    pub fn apply_reload(
        &mut self,
        ticket: ReloadTicket,
        outcome: ApiOutcome<ProjectList>,
    ) -> ReloadApplied {
        if self.ordering == ReloadOrdering::LatestIssuedWins && ticket.seq != self.issued_seq {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.issued_seq,
                "Discarding superseded reload",
            );
            return ReloadApplied::Discarded;
        }

        self.loading = false;
        match outcome {
            Ok(list) => {
                let count = list.items.len();
                self.items = list.items;
                tracing::debug!(seq = ticket.seq, count, "Project list replaced");
                ReloadApplied::Replaced { count }
            }
            Err(failure) => {
                tracing::warn!(seq = ticket.seq, error = %failure, "Project list reload failed");
                self.notices.push(Notice::error(failure.message_or(LOAD_FAILED)));
                ReloadApplied::Failed
            }
        }
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) -> ReloadTicket {
        self.filters.status = status;
        self.begin_reload()
    }

    pub fn set_user_filter(
        &mut self,
        user_id: impl Into<String>,
    ) -> Result<ReloadTicket, ViewError> {
        if !self.is_admin {
            return Err(ViewError::AdminOnly);
        }
        self.filters.user_id = user_id.into();
        Ok(self.begin_reload())
    }

    /// Reset both filters; one reload covers the change.
    pub fn clear_filters(&mut self) -> ReloadTicket {
        self.filters = FilterSelection::default();
        self.begin_reload()
    }

    // ---- adding ----

    pub fn start_adding(&mut self) -> Result<(), ViewError> {
        self.require_idle("add a project")?;
        self.mode = RowMode::Adding {
            draft: ProjectDraft::default(),
        };
        Ok(())
    }

    pub fn draft(&self) -> Option<&ProjectDraft> {
        match &self.mode {
            RowMode::Adding { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn set_draft_name(&mut self, name: impl Into<String>) -> Result<(), ViewError> {
        self.draft_mut("edit the draft")?.project_name = name.into();
        Ok(())
    }

    pub fn set_draft_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), ViewError> {
        self.draft_mut("edit the draft")?.description = description.into();
        Ok(())
    }

    /// Validate the draft. An empty name queues a warning and keeps the
    /// draft open; nothing is to be sent.
    pub fn submit_draft(&mut self) -> Result<Submission<NewProject>, ViewError> {
        let draft = self.draft_mut("save a draft")?;
        match draft.validate() {
            Ok(project) => Ok(Submission::Ready(project)),
            Err(CoreError::Validation(message)) => {
                self.notices.push(Notice::warning(message));
                Ok(Submission::Blocked)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Take the create outcome. On success the draft is discarded and the
    /// returned reload must be performed; on failure the draft stays open.
    pub fn finish_create(&mut self, outcome: ApiOutcome<WriteAck>) -> Option<ReloadTicket> {
        match outcome {
            Ok(_) => {
                self.notices.push(Notice::success("Project added"));
                let ticket = self.begin_reload();
                if matches!(self.mode, RowMode::Adding { .. }) {
                    self.mode = RowMode::Idle;
                }
                Some(ticket)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Project create failed");
                self.notices.push(Notice::error(failure.message_or(CREATE_FAILED)));
                None
            }
        }
    }

    pub fn cancel_adding(&mut self) -> Result<(), ViewError> {
        self.draft_mut("cancel a draft")?;
        self.mode = RowMode::Idle;
        Ok(())
    }

    // ---- editing ----

    /// Open the status selector on row `id`, seeded with its current status.
    pub fn start_editing(&mut self, id: DbId) -> Result<(), ViewError> {
        self.require_idle("edit a status")?;
        let project = self
            .items
            .iter()
            .find(|p| p.id == id)
            .ok_or(CoreError::UnknownProject(id))?;
        self.mode = RowMode::Editing {
            id,
            status: project.status,
        };
        Ok(())
    }

    pub fn set_edit_status(&mut self, status: ProjectStatus) -> Result<(), ViewError> {
        match &mut self.mode {
            RowMode::Editing { status: slot, .. } => {
                *slot = status;
                Ok(())
            }
            other => Err(ViewError::InvalidTransition {
                action: "change the edited status",
                mode: other.name(),
            }),
        }
    }

    /// The status change to send. Transition legality is the server's call.
    pub fn submit_edit(&self) -> Result<PendingUpdate, ViewError> {
        match &self.mode {
            RowMode::Editing { id, status } => Ok(PendingUpdate {
                id: *id,
                status: *status,
            }),
            other => Err(ViewError::InvalidTransition {
                action: "save a status",
                mode: other.name(),
            }),
        }
    }

    /// Take the update outcome. Mirrors [`finish_create`](Self::finish_create).
    pub fn finish_update(
        &mut self,
        update: PendingUpdate,
        outcome: ApiOutcome<WriteAck>,
    ) -> Option<ReloadTicket> {
        match outcome {
            Ok(_) => {
                self.notices.push(Notice::success("Status updated"));
                let ticket = self.begin_reload();
                if matches!(self.mode, RowMode::Editing { id, .. } if id == update.id) {
                    self.mode = RowMode::Idle;
                }
                Some(ticket)
            }
            Err(failure) => {
                tracing::warn!(project_id = update.id, error = %failure, "Status update failed");
                self.notices.push(Notice::error(failure.message_or(UPDATE_FAILED)));
                None
            }
        }
    }

    pub fn cancel_editing(&mut self) -> Result<(), ViewError> {
        match self.mode {
            RowMode::Editing { .. } => {
                self.mode = RowMode::Idle;
                Ok(())
            }
            ref other => Err(ViewError::InvalidTransition {
                action: "cancel an edit",
                mode: other.name(),
            }),
        }
    }

    // ---- private helpers ----

    fn require_idle(&self, action: &'static str) -> Result<(), ViewError> {
        match self.mode {
            RowMode::Idle => Ok(()),
            ref other => Err(ViewError::InvalidTransition {
                action,
                mode: other.name(),
            }),
        }
    }

    fn draft_mut(&mut self, action: &'static str) -> Result<&mut ProjectDraft, ViewError> {
        match &mut self.mode {
            RowMode::Adding { draft } => Ok(draft),
            other => Err(ViewError::InvalidTransition {
                action,
                mode: other.name(),
            }),
        }
    }
}
