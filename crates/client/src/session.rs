//! Scoped session context.
//!
//! The identity resolved at startup is carried in a [`Session`] handed to
//! every component that needs it, rather than published into global state.

use std::sync::Arc;

use pmtrack_core::identity::Identity;
use pmtrack_core::types::DbId;
use serde::Serialize;

/// Immutable identity for the lifetime of one session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Arc<Identity>,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin
    }

    /// The identity subset attached to every project API request.
    pub fn auth_payload(&self) -> AuthPayload {
        AuthPayload {
            user_id: self.identity.user_id,
            first_name: self.identity.first_name.clone(),
            last_name: self.identity.last_name.clone(),
            is_admin: u8::from(self.identity.is_admin),
        }
    }
}

/// Wire form of the caller identity. The API expects `is_admin` as `0`/`1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthPayload {
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: u8,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn auth_payload_encodes_admin_as_integer() {
        let session = Session::new(Identity::local_dev());
        assert_eq!(
            serde_json::to_value(session.auth_payload()).unwrap(),
            json!({ "user_id": 1, "first_name": "Test", "last_name": "User", "is_admin": 1 })
        );
    }

    #[test]
    fn non_admin_payload() {
        let session = Session::new(Identity {
            is_admin: false,
            ..Identity::local_dev()
        });
        assert_eq!(session.auth_payload().is_admin, 0);
        assert!(!session.is_admin());
    }
}
