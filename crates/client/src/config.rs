use std::time::Duration;

use reqwest::Url;

/// API base used when the page is served from a loopback host.
pub const LOCAL_API_BASE: &str = "http://localhost:5000/api";

/// API base used from every other host.
pub const DEPLOYED_API_BASE: &str = "https://pmgui-production.up.railway.app/api";

/// Identity provider base (`GET {base}/auth/me`).
pub const DEFAULT_AUTH_API_BASE: &str = "https://tsmbackend-production.up.railway.app/api";

/// External portal that owns the sign-in page.
pub const DEFAULT_PORTAL_BASE: &str = "https://www.thirdshiftmedia.agency";

/// Page location assumed when none is configured.
pub const DEFAULT_PAGE_URL: &str = "http://localhost:5173/projects";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL ({value:?}): {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// True when `host` looks like a loopback/development host.
///
/// The same test selects the local API base and unlocks the development
/// identity, so it must stay a plain substring check on the hostname.
pub fn is_loopback_host(host: &str) -> bool {
    host.contains("localhost") || host.contains("127.")
}

/// Pick the project API base for a page hostname.
///
/// A non-empty `override_base` always wins; otherwise loopback hosts get
/// [`LOCAL_API_BASE`] and everything else [`DEPLOYED_API_BASE`].
pub fn select_api_base(host: &str, override_base: Option<&str>) -> String {
    if let Some(base) = override_base.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }
    if is_loopback_host(host) {
        LOCAL_API_BASE.to_string()
    } else {
        DEPLOYED_API_BASE.to_string()
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Location of the page the client runs in. Its hostname drives endpoint
    /// selection and it is the `redirect` target after sign-in.
    pub page_url: Url,
    /// Resolved project API base.
    pub api_base: String,
    /// Identity provider base.
    pub auth_api_base: String,
    /// Sign-in page of the external portal, without query.
    pub sign_in_page: Url,
    /// Ambient session credential forwarded to the identity endpoint.
    pub session_cookie: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                        | Default                          |
    /// |--------------------------------|----------------------------------|
    /// | `PMTRACK_PAGE_URL`             | [`DEFAULT_PAGE_URL`]             |
    /// | `PMTRACK_API_BASE`             | selected from the page host      |
    /// | `PMTRACK_AUTH_API_BASE`        | [`DEFAULT_AUTH_API_BASE`]        |
    /// | `PMTRACK_PORTAL_BASE`          | [`DEFAULT_PORTAL_BASE`]          |
    /// | `PMTRACK_SESSION_COOKIE`       | unset                            |
    /// | `PMTRACK_REQUEST_TIMEOUT_SECS` | `30`                             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_raw = lookup("PMTRACK_PAGE_URL")
            .unwrap_or_else(|| DEFAULT_PAGE_URL.into());
        let page_url = parse_url("PMTRACK_PAGE_URL", &page_raw)?;

        let host = page_url.host_str().unwrap_or_default().to_string();
        let override_base = lookup("PMTRACK_API_BASE");
        let api_base = select_api_base(&host, override_base.as_deref());

        let auth_api_base = lookup("PMTRACK_AUTH_API_BASE")
            .unwrap_or_else(|| DEFAULT_AUTH_API_BASE.into())
            .trim_end_matches('/')
            .to_string();
        parse_url("PMTRACK_AUTH_API_BASE", &auth_api_base)?;

        let portal_base = lookup("PMTRACK_PORTAL_BASE")
            .unwrap_or_else(|| DEFAULT_PORTAL_BASE.into())
            .trim_end_matches('/')
            .to_string();
        let sign_in_page = parse_url("PMTRACK_PORTAL_BASE", &format!("{portal_base}/signin"))?;

        let session_cookie = lookup("PMTRACK_SESSION_COOKIE")
            .filter(|c| !c.trim().is_empty());

        let timeout_secs = match lookup("PMTRACK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "PMTRACK_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            page_url,
            api_base,
            auth_api_base,
            sign_in_page,
            session_cookie,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build the shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
