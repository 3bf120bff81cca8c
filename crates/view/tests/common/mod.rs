//! Scripted [`ProjectsApi`] for driving the controller.
//!
//! Replies are queued per operation and consumed in call order. A gated
//! reply parks the call until the test releases it, which lets a test pick
//! the order in which concurrent responses arrive.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pmtrack_client::api::{ProjectList, ProjectsApi, WriteAck};
use pmtrack_client::outcome::{ApiFailure, ApiOutcome, FailureKind};
use pmtrack_core::draft::NewProject;
use pmtrack_core::filter::FilterSelection;
use pmtrack_core::project::{Project, ProjectStatus};
use pmtrack_core::types::DbId;
use serde_json::Map;
use tokio::sync::oneshot;

pub enum Reply<T> {
    Now(ApiOutcome<T>),
    Gated(oneshot::Receiver<ApiOutcome<T>>),
}

#[derive(Default)]
pub struct ScriptedApi {
    lists: Mutex<VecDeque<Reply<ProjectList>>>,
    creates: Mutex<VecDeque<Reply<WriteAck>>>,
    updates: Mutex<VecDeque<Reply<WriteAck>>>,
    list_calls: Mutex<Vec<FilterSelection>>,
    create_calls: Mutex<Vec<NewProject>>,
    update_calls: Mutex<Vec<(DbId, ProjectStatus)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_ok(&self, items: Vec<Project>) {
        self.lists
            .lock()
            .unwrap()
            .push_back(Reply::Now(Ok(ProjectList { items })));
    }

    pub fn list_err(&self, failure: ApiFailure) {
        self.lists.lock().unwrap().push_back(Reply::Now(Err(failure)));
    }

    /// Queue a list reply that is held until the returned sender fires.
    pub fn list_gated(&self) -> oneshot::Sender<ApiOutcome<ProjectList>> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub fn create_reply(&self, outcome: ApiOutcome<WriteAck>) {
        self.creates.lock().unwrap().push_back(Reply::Now(outcome));
    }

    pub fn update_reply(&self, outcome: ApiOutcome<WriteAck>) {
        self.updates.lock().unwrap().push_back(Reply::Now(outcome));
    }

    pub fn list_calls(&self) -> Vec<FilterSelection> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<NewProject> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(DbId, ProjectStatus)> {
        self.update_calls.lock().unwrap().clone()
    }

    /// Yield until at least `n` list calls have been made.
    pub async fn wait_for_list_calls(&self, n: usize) {
        while self.list_calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

async fn resolve<T>(queue: &Mutex<VecDeque<Reply<T>>>, what: &str) -> ApiOutcome<T> {
    let reply = queue.lock().unwrap().pop_front();
    match reply {
        Some(Reply::Now(outcome)) => outcome,
        Some(Reply::Gated(rx)) => rx
            .await
            .unwrap_or_else(|_| Err(failure(FailureKind::Transport, None, Some("gate dropped")))),
        None => panic!("unscripted {what} call"),
    }
}

#[async_trait]
impl ProjectsApi for ScriptedApi {
    async fn list_projects(&self, filters: &FilterSelection) -> ApiOutcome<ProjectList> {
        self.list_calls.lock().unwrap().push(filters.clone());
        resolve(&self.lists, "list").await
    }

    async fn create_project(&self, project: &NewProject) -> ApiOutcome<WriteAck> {
        self.create_calls.lock().unwrap().push(project.clone());
        resolve(&self.creates, "create").await
    }

    async fn update_project_status(&self, id: DbId, status: ProjectStatus) -> ApiOutcome<WriteAck> {
        self.update_calls.lock().unwrap().push((id, status));
        resolve(&self.updates, "update").await
    }
}

pub fn failure(kind: FailureKind, status: Option<u16>, error: Option<&str>) -> ApiFailure {
    ApiFailure {
        kind,
        status,
        error: error.map(str::to_string),
        body: Map::new(),
    }
}

pub fn project(id: DbId, name: &str, status: ProjectStatus) -> Project {
    project_for_user(id, name, status, 1, "Test", "User")
}

pub fn project_for_user(
    id: DbId,
    name: &str,
    status: ProjectStatus,
    user_id: DbId,
    first: &str,
    last: &str,
) -> Project {
    Project {
        id,
        project_name: name.to_string(),
        description: None,
        status,
        user_id,
        user_first_name: first.to_string(),
        user_last_name: last.to_string(),
        started_at: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        ended_at: None,
    }
}
