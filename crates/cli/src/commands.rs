//! Subcommand handlers.

use pmtrack_client::api::{PmClient, ProjectsApi};
use pmtrack_client::config::ClientConfig;
use pmtrack_client::session::Session;
use pmtrack_core::filter::FilterSelection;
use pmtrack_view::controller::{ProjectsController, SaveOutcome};
use pmtrack_view::settings::ViewSettings;
use pmtrack_view::state::{ProjectsView, ReloadApplied, ViewError};

use crate::output::Printer;
use crate::Command;

/// How a command ended. Notices already explain a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

pub(crate) async fn dispatch(
    command: Command,
    config: &ClientConfig,
    settings: &ViewSettings,
    session: Session,
    printer: &Printer,
) -> anyhow::Result<Outcome> {
    match command {
        Command::Whoami => {
            printer.identity(session.identity());
            Ok(Outcome::Done)
        }
        Command::Ping => {
            let client = PmClient::from_config(config, session)?;
            match client.health().await {
                Ok(()) => {
                    printer.message(&format!("{} is up", client.api_base()));
                    Ok(Outcome::Done)
                }
                Err(failure) => {
                    tracing::error!(
                        api_base = client.api_base(),
                        error = %failure,
                        "Health check failed",
                    );
                    eprintln!("error: {failure}");
                    Ok(Outcome::Failed)
                }
            }
        }
        Command::List { status, user_id } => {
            if user_id.is_some() && !session.is_admin() {
                tracing::warn!("Ignoring --user: filtering by user is limited to admins");
            }
            let filters = FilterSelection::new(
                status.unwrap_or_default(),
                user_id.map(|id| id.to_string()).unwrap_or_default(),
            );
            let controller = controller(config, settings, session, filters)?;
            let loaded = controller.mount().await;
            finish(&controller, printer, loaded == ReloadApplied::Failed).await
        }
        Command::Add { name, description } => {
            let controller = controller(config, settings, session, FilterSelection::default())?;
            controller.mount().await;
            let step = controller.start_adding().await;
            flush_on_error(&controller, printer, step).await?;
            let step = controller.edit_draft(name, description).await;
            flush_on_error(&controller, printer, step).await?;
            let step = controller.save_draft().await;
            let saved = flush_on_error(&controller, printer, step).await?;
            finish(&controller, printer, !is_saved(saved)).await
        }
        Command::SetStatus { id, status } => {
            let controller = controller(config, settings, session, FilterSelection::default())?;
            if controller.mount().await == ReloadApplied::Failed {
                return finish(&controller, printer, true).await;
            }
            let step = controller.start_editing(id).await;
            flush_on_error(&controller, printer, step).await?;
            let step = controller.set_edit_status(status).await;
            flush_on_error(&controller, printer, step).await?;
            let step = controller.save_edit().await;
            let saved = flush_on_error(&controller, printer, step).await?;
            finish(&controller, printer, !is_saved(saved)).await
        }
    }
}

fn controller(
    config: &ClientConfig,
    settings: &ViewSettings,
    session: Session,
    filters: FilterSelection,
) -> anyhow::Result<ProjectsController<PmClient>> {
    let view = ProjectsView::new(session.identity(), settings.ordering).with_filters(filters);
    let client = PmClient::from_config(config, session)?;
    Ok(ProjectsController::new(client, view))
}

fn is_saved(outcome: SaveOutcome) -> bool {
    match outcome {
        SaveOutcome::Saved { reload } => reload != ReloadApplied::Failed,
        SaveOutcome::Blocked | SaveOutcome::Failed => false,
    }
}

/// Print queued notices before a refused step ends the command.
async fn flush_on_error<A: ProjectsApi, T>(
    controller: &ProjectsController<A>,
    printer: &Printer,
    step: Result<T, ViewError>,
) -> anyhow::Result<T> {
    if step.is_err() {
        printer.notices(&controller.take_notices().await);
    }
    Ok(step?)
}

/// Flush notices, print the list as it now stands and map to an outcome.
async fn finish<A: ProjectsApi>(
    controller: &ProjectsController<A>,
    printer: &Printer,
    failed: bool,
) -> anyhow::Result<Outcome> {
    printer.notices(&controller.take_notices().await);
    controller.with_view(|view| printer.projects(view)).await;
    if failed {
        Ok(Outcome::Failed)
    } else {
        Ok(Outcome::Done)
    }
}
