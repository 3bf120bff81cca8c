//! Normalized outcome of project API calls.
//!
//! Every call resolves to `Result<T, ApiFailure>`. Transport errors,
//! non-2xx statuses, bodies that say `"ok": false` and bodies that do not
//! fit the expected shape all end up as an [`ApiFailure`]; nothing else
//! escapes the client.

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Outcome of a project API call.
pub type ApiOutcome<T> = Result<T, ApiFailure>;

/// What went wrong with a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a response (connect, DNS, timeout).
    Transport,
    /// The server answered with a non-2xx status.
    Status,
    /// The server answered 2xx but the body carried `"ok": false`.
    Rejected,
    /// The body was JSON but did not have the expected shape.
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Transport => "transport failure",
            FailureKind::Status => "HTTP error",
            FailureKind::Rejected => "rejected by server",
            FailureKind::Decode => "unexpected response",
        })
    }
}

/// The single failure shape returned by the data client.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub kind: FailureKind,
    /// HTTP status, present for [`FailureKind::Status`] and [`FailureKind::Decode`].
    pub status: Option<u16>,
    /// Server-reported `error` string, or the stringified transport cause.
    pub error: Option<String>,
    /// Remaining fields of the parsed body (empty when unparseable).
    pub body: Map<String, Value>,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " ({status})")?;
        }
        write!(f, ": {}", self.error.as_deref().unwrap_or("no details"))
    }
}

impl std::error::Error for ApiFailure {}

impl ApiFailure {
    pub fn transport(err: &reqwest::Error) -> Self {
        Self {
            kind: FailureKind::Transport,
            status: None,
            error: Some(err.to_string()),
            body: Map::new(),
        }
    }

    /// Message to show the user, falling back to `fallback` when the server
    /// gave no `error` string.
    pub fn message_or(&self, fallback: &str) -> String {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Parse a response body leniently: anything that is not a JSON object is
/// treated as an empty object.
pub fn parse_body(bytes: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Apply the `ok` rules to a response: the status decides, unless a 2xx
/// body explicitly says `"ok": false`.
pub fn normalize(status: StatusCode, bytes: &[u8]) -> ApiOutcome<Map<String, Value>> {
    let body = parse_body(bytes);
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !status.is_success() {
        return Err(ApiFailure {
            kind: FailureKind::Status,
            status: Some(status.as_u16()),
            error,
            body,
        });
    }

    if body.get("ok") == Some(&Value::Bool(false)) {
        return Err(ApiFailure {
            kind: FailureKind::Rejected,
            status: None,
            error,
            body,
        });
    }

    Ok(body)
}

/// Decode a normalized success body into `T`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: Map<String, Value>) -> ApiOutcome<T> {
    serde_json::from_value(Value::Object(body.clone())).map_err(|e| ApiFailure {
        kind: FailureKind::Decode,
        status: Some(status.as_u16()),
        error: Some(format!("invalid response body: {e}")),
        body,
    })
}
