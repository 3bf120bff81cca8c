//! Project API client.
//!
//! [`ProjectsApi`] is the seam the view layer depends on; [`PmClient`] is
//! the HTTP implementation built on [`reqwest`]. Every request carries the
//! session's [`AuthPayload`], which is the only authorization signal the
//! API receives.

use std::sync::Arc;

use async_trait::async_trait;
use pmtrack_core::draft::NewProject;
use pmtrack_core::filter::FilterSelection;
use pmtrack_core::project::{Project, ProjectStatus};
use pmtrack_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ClientConfig, ConfigError};
use crate::outcome::{self, ApiFailure, ApiOutcome};
use crate::session::{AuthPayload, Session};

/// Successful list response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectList {
    /// Missing `items` reads as an empty page.
    #[serde(default)]
    pub items: Vec<Project>,
}

/// Successful write response. The server echoes the written row, but callers
/// must not rely on it: the list is only ever refreshed by re-listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteAck {
    pub item: Option<Project>,
}

impl WriteAck {
    fn from_body(body: &Map<String, Value>) -> Self {
        let item = body.get("item").and_then(|raw| {
            serde_json::from_value(raw.clone())
                .map_err(|e| tracing::debug!(error = %e, "Ignoring unreadable echoed item"))
                .ok()
        });
        Self { item }
    }
}

/// The three project operations.
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    /// List projects matching `filters`, scoped by the server to the caller
    /// unless the caller is an admin. `filters` is sent unchanged.
    async fn list_projects(&self, filters: &FilterSelection) -> ApiOutcome<ProjectList>;

    /// Create a project. The server assigns id, `ONGOING` and `started_at`.
    async fn create_project(&self, project: &NewProject) -> ApiOutcome<WriteAck>;

    /// Request a status transition. Legality is decided by the server.
    async fn update_project_status(&self, id: DbId, status: ProjectStatus) -> ApiOutcome<WriteAck>;
}

#[async_trait]
impl<T: ProjectsApi + ?Sized> ProjectsApi for Arc<T> {
    async fn list_projects(&self, filters: &FilterSelection) -> ApiOutcome<ProjectList> {
        (**self).list_projects(filters).await
    }

    async fn create_project(&self, project: &NewProject) -> ApiOutcome<WriteAck> {
        (**self).create_project(project).await
    }

    async fn update_project_status(&self, id: DbId, status: ProjectStatus) -> ApiOutcome<WriteAck> {
        (**self).update_project_status(id, status).await
    }
}

#[derive(Serialize)]
struct ListRequest<'a> {
    auth: AuthPayload,
    filters: &'a FilterSelection,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    auth: AuthPayload,
    #[serde(flatten)]
    project: &'a NewProject,
}

#[derive(Serialize)]
struct StatusRequest {
    auth: AuthPayload,
    status: ProjectStatus,
}

/// HTTP client for the project API.
pub struct PmClient {
    http: reqwest::Client,
    api_base: String,
    session: Session,
}

impl PmClient {
    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// * `api_base` - e.g. `http://localhost:5000/api`, no trailing slash.
    pub fn with_client(
        http: reqwest::Client,
        api_base: impl Into<String>,
        session: Session,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            session,
        }
    }

    /// Create a client from configuration, building its own HTTP client.
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self, ConfigError> {
        let http = config.http_client()?;
        Ok(Self::with_client(http, config.api_base.clone(), session))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `GET /health`; succeeds when the API answers 2xx without `"ok": false`.
    pub async fn health(&self) -> ApiOutcome<()> {
        let request = self.http.get(format!("{}/health", self.api_base));
        self.send(request).await.map(|_| ())
    }

    // ---- private helpers ----

    /// Send a request and normalize whatever comes back. An unreadable body
    /// is treated like an empty one.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ApiOutcome<(reqwest::StatusCode, Map<String, Value>)> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Project API request failed");
            ApiFailure::transport(&e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();

        match outcome::normalize(status, &bytes) {
            Ok(body) => Ok((status, body)),
            Err(failure) => {
                tracing::warn!(
                    status = status.as_u16(),
                    error = failure.error.as_deref().unwrap_or(""),
                    "Project API returned a failure",
                );
                Err(failure)
            }
        }
    }
}

#[async_trait]
impl ProjectsApi for PmClient {
    async fn list_projects(&self, filters: &FilterSelection) -> ApiOutcome<ProjectList> {
        tracing::debug!(status = %filters.status, user_id = %filters.user_id, "Listing projects");

        let body = ListRequest {
            auth: self.session.auth_payload(),
            filters,
        };
        let request = self
            .http
            .post(format!("{}/projects/list", self.api_base))
            .json(&body);

        let (status, body) = self.send(request).await?;
        outcome::decode(status, body)
    }

    async fn create_project(&self, project: &NewProject) -> ApiOutcome<WriteAck> {
        tracing::debug!(project_name = project.project_name(), "Creating project");

        let body = CreateRequest {
            auth: self.session.auth_payload(),
            project,
        };
        let request = self
            .http
            .post(format!("{}/projects", self.api_base))
            .json(&body);

        let (_, body) = self.send(request).await?;
        Ok(WriteAck::from_body(&body))
    }

    async fn update_project_status(&self, id: DbId, status: ProjectStatus) -> ApiOutcome<WriteAck> {
        tracing::debug!(project_id = id, %status, "Updating project status");

        let body = StatusRequest {
            auth: self.session.auth_payload(),
            status,
        };
        let request = self
            .http
            .patch(format!("{}/projects/{}/status", self.api_base, id))
            .json(&body);

        let (_, body) = self.send(request).await?;
        Ok(WriteAck::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use pmtrack_core::draft::ProjectDraft;
    use pmtrack_core::filter::StatusFilter;
    use pmtrack_core::identity::Identity;
    use serde_json::json;

    use super::*;

    fn session() -> Session {
        Session::new(Identity::local_dev())
    }

    #[test]
    fn list_body_wraps_auth_and_filters() {
        let filters = FilterSelection::new(StatusFilter::Ongoing, "");
        let body = ListRequest {
            auth: session().auth_payload(),
            filters: &filters,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "auth": { "user_id": 1, "first_name": "Test", "last_name": "User", "is_admin": 1 },
                "filters": { "status": "ONGOING", "user_id": "" },
            })
        );
    }

    #[test]
    fn create_body_is_flat() {
        let project = ProjectDraft::new(" Launch ", "").validate().unwrap();
        let body = CreateRequest {
            auth: session().auth_payload(),
            project: &project,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["project_name"], "Launch");
        assert_eq!(value["description"], "");
        assert_eq!(value["auth"]["user_id"], 1);
    }

    #[test]
    fn write_ack_tolerates_missing_or_broken_item() {
        assert_eq!(WriteAck::from_body(&Map::new()), WriteAck::default());

        let mut body = Map::new();
        body.insert("item".into(), json!({ "id": "not a row" }));
        assert!(WriteAck::from_body(&body).item.is_none());
    }

    #[test]
    fn list_without_items_is_empty() {
        let list: ProjectList = serde_json::from_value(json!({ "ok": true })).unwrap();
        assert!(list.items.is_empty());
    }
}
