//! Async driver for [`ProjectsView`].
//!
//! [`ProjectsController`] performs the network calls the state machine asks
//! for. The view lock is only held to start an operation and to apply its
//! result, never across a call, so reloads issued back to back are in
//! flight together and land in whatever order the server answers.

use pmtrack_client::api::ProjectsApi;
use pmtrack_core::filter::StatusFilter;
use pmtrack_core::project::ProjectStatus;
use pmtrack_core::types::DbId;
use tokio::sync::Mutex;

use crate::notice::Notice;
use crate::state::{ProjectsView, ReloadApplied, ReloadTicket, Submission, ViewError};

/// Result of saving the add row or the edited status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Rejected locally; nothing was sent.
    Blocked,
    /// The server refused or could not be reached; the form stays open.
    Failed,
    /// Written, followed by a full reload.
    Saved { reload: ReloadApplied },
}

pub struct ProjectsController<A> {
    api: A,
    view: Mutex<ProjectsView>,
}

impl<A: ProjectsApi> ProjectsController<A> {
    pub fn new(api: A, view: ProjectsView) -> Self {
        Self {
            api,
            view: Mutex::new(view),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Initial load with whatever filters the view starts with.
    pub async fn mount(&self) -> ReloadApplied {
        tracing::info!("Loading project list");
        self.reload().await
    }

    pub async fn reload(&self) -> ReloadApplied {
        let ticket = self.view.lock().await.begin_reload();
        self.perform_reload(ticket).await
    }

    // ---- filters ----

    pub async fn set_status_filter(&self, status: StatusFilter) -> ReloadApplied {
        let ticket = self.view.lock().await.set_status_filter(status);
        self.perform_reload(ticket).await
    }

    pub async fn set_user_filter(
        &self,
        user_id: impl Into<String>,
    ) -> Result<ReloadApplied, ViewError> {
        let ticket = self.view.lock().await.set_user_filter(user_id)?;
        Ok(self.perform_reload(ticket).await)
    }

    pub async fn clear_filters(&self) -> ReloadApplied {
        let ticket = self.view.lock().await.clear_filters();
        self.perform_reload(ticket).await
    }

    // ---- add row ----

    pub async fn start_adding(&self) -> Result<(), ViewError> {
        self.view.lock().await.start_adding()
    }

    /// Replace both draft fields.
    pub async fn edit_draft(
        &self,
        project_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), ViewError> {
        let mut view = self.view.lock().await;
        view.set_draft_name(project_name)?;
        view.set_draft_description(description)
    }

    pub async fn cancel_adding(&self) -> Result<(), ViewError> {
        self.view.lock().await.cancel_adding()
    }

    pub async fn save_draft(&self) -> Result<SaveOutcome, ViewError> {
        let submission = self.view.lock().await.submit_draft()?;
        let project = match submission {
            Submission::Blocked => return Ok(SaveOutcome::Blocked),
            Submission::Ready(project) => project,
        };

        let outcome = self.api.create_project(&project).await;
        if outcome.is_ok() {
            tracing::info!(project_name = project.project_name(), "Project created");
        }
        let ticket = self.view.lock().await.finish_create(outcome);
        Ok(self.after_write(ticket).await)
    }

    // ---- status edit ----

    pub async fn start_editing(&self, id: DbId) -> Result<(), ViewError> {
        self.view.lock().await.start_editing(id)
    }

    pub async fn set_edit_status(&self, status: ProjectStatus) -> Result<(), ViewError> {
        self.view.lock().await.set_edit_status(status)
    }

    pub async fn cancel_editing(&self) -> Result<(), ViewError> {
        self.view.lock().await.cancel_editing()
    }

    pub async fn save_edit(&self) -> Result<SaveOutcome, ViewError> {
        let update = self.view.lock().await.submit_edit()?;

        let outcome = self.api.update_project_status(update.id, update.status).await;
        if outcome.is_ok() {
            tracing::info!(
                project_id = update.id,
                status = %update.status,
                "Project status updated",
            );
        }
        let ticket = self.view.lock().await.finish_update(update, outcome);
        Ok(self.after_write(ticket).await)
    }

    // ---- inspection ----

    /// Run `f` against the current state.
    pub async fn with_view<R>(&self, f: impl FnOnce(&ProjectsView) -> R) -> R {
        f(&*self.view.lock().await)
    }

    pub async fn take_notices(&self) -> Vec<Notice> {
        self.view.lock().await.take_notices()
    }

    // ---- private helpers ----

    async fn perform_reload(&self, ticket: ReloadTicket) -> ReloadApplied {
        let outcome = self.api.list_projects(ticket.filters()).await;
        let seq = ticket.seq();
        let applied = self.view.lock().await.apply_reload(ticket, outcome);
        tracing::debug!(seq, ?applied, "Reload finished");
        applied
    }

    async fn after_write(&self, ticket: Option<ReloadTicket>) -> SaveOutcome {
        match ticket {
            Some(ticket) => SaveOutcome::Saved {
                reload: self.perform_reload(ticket).await,
            },
            None => SaveOutcome::Failed,
        }
    }
}
