//! In-process stub of the project API and identity provider.
//!
//! Every request is recorded; responses are scripted per `"METHOD /path"`
//! key. Unscripted routes answer 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use pmtrack_client::session::Session;
use pmtrack_core::identity::Identity;
use serde_json::Value;

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when absent or not JSON.
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct StubApi {
    responses: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for `route` (e.g. `"POST /api/projects/list"`).
    pub fn respond(&self, route: &str, status: StatusCode, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(route.to_string(), (status, body.into()));
    }

    pub fn respond_json(&self, route: &str, status: StatusCode, body: Value) {
        self.respond(route, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and serve in the background. Returns the
    /// base URL, e.g. `http://127.0.0.1:54321`.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }
}

async fn record_and_respond(
    State(stub): State<StubApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let key = format!("{} {}", method, uri.path());
    stub.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let (status, body) = stub
        .responses
        .lock()
        .unwrap()
        .get(&key)
        .cloned()
        .unwrap_or((
            StatusCode::NOT_FOUND,
            r#"{"ok":false,"error":"not found"}"#.to_string(),
        ));

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn admin_session() -> Session {
    Session::new(Identity::local_dev())
}

pub fn member_session() -> Session {
    Session::new(Identity {
        user_id: 42,
        first_name: "Mia".to_string(),
        last_name: "Member".to_string(),
        is_admin: false,
        can_update_data: true,
        email: "mia@example.com".to_string(),
    })
}
