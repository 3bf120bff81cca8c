//! Auth gate: resolve the session identity before anything renders.
//!
//! On a loopback host the fixed development identity is returned without
//! touching the network. Everywhere else the identity provider's
//! `GET /auth/me` is called with the ambient session cookie; any failure
//! means the user has to sign in at the external portal, and the gate
//! returns the redirect target instead of an identity.

use pmtrack_core::identity::{flag_from_json, id_from_json, Identity};
use reqwest::header::COOKIE;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{is_loopback_host, ClientConfig, ConfigError};
use crate::session::Session;

/// Why no identity could be produced. Either way, rendering must not
/// proceed.
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    /// The identity provider refused or could not be reached. The caller
    /// must send the user to `redirect_to`.
    #[error("Sign-in required ({reason}); continue at {redirect_to}")]
    SignInRequired { redirect_to: Url, reason: String },

    /// The provider answered but without a usable user id.
    #[error("Identity response has no user id")]
    Incomplete,
}

/// Raw `/auth/me` payload. Flags and ids arrive loosely typed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIdentity {
    id: Value,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    is_admin: Value,
    can_update_data: Value,
}

impl RawIdentity {
    fn into_identity(self) -> Result<Identity, AuthFailure> {
        let user_id = id_from_json(&self.id).ok_or(AuthFailure::Incomplete)?;
        Ok(Identity {
            user_id,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            is_admin: flag_from_json(&self.is_admin),
            can_update_data: flag_from_json(&self.can_update_data),
            email: self.email.unwrap_or_default(),
        })
    }
}

/// Identity resolution against the external provider.
pub struct AuthGate {
    http: reqwest::Client,
    auth_api_base: String,
    sign_in_page: Url,
    session_cookie: Option<String>,
}

impl AuthGate {
    pub fn new(
        http: reqwest::Client,
        auth_api_base: impl Into<String>,
        sign_in_page: Url,
        session_cookie: Option<String>,
    ) -> Self {
        Self {
            http,
            auth_api_base: auth_api_base.into(),
            sign_in_page,
            session_cookie,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.http_client()?,
            config.auth_api_base.clone(),
            config.sign_in_page.clone(),
            config.session_cookie.clone(),
        ))
    }

    /// Sign-in URL that returns the user to `page_url` afterwards.
    pub fn sign_in_url(&self, page_url: &Url) -> Url {
        let mut url = self.sign_in_page.clone();
        url.query_pairs_mut()
            .append_pair("redirect", page_url.as_str());
        url
    }

    /// Resolve the identity for a page served at `page_url`.
    pub async fn resolve_identity(&self, page_url: &Url) -> Result<Identity, AuthFailure> {
        let host = page_url.host_str().unwrap_or_default();
        if is_loopback_host(host) {
            tracing::warn!(host, "Using local development identity");
            return Ok(Identity::local_dev());
        }

        let mut request = self.http.get(format!("{}/auth/me", self.auth_api_base));
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Identity check failed");
                return Err(self.sign_in_required(page_url, e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::info!(status = status.as_u16(), "Identity provider refused");
            return Err(self.sign_in_required(
                page_url,
                format!("identity endpoint returned {status}"),
            ));
        }

        let raw = match response.json::<RawIdentity>().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Unreadable identity response");
                return Err(self.sign_in_required(page_url, e.to_string()));
            }
        };

        let identity = raw.into_identity()?;
        tracing::info!(
            user_id = identity.user_id,
            is_admin = identity.is_admin,
            "Authenticated user",
        );
        Ok(identity)
    }

    /// Resolve the identity and wrap it in a [`Session`].
    pub async fn establish_session(&self, page_url: &Url) -> Result<Session, AuthFailure> {
        self.resolve_identity(page_url).await.map(Session::new)
    }

    fn sign_in_required(&self, page_url: &Url, reason: String) -> AuthFailure {
        AuthFailure::SignInRequired {
            redirect_to: self.sign_in_url(page_url),
            reason,
        }
    }
}
