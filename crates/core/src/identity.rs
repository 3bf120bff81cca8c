//! Session identity and the flag normalization applied at ingestion.
//!
//! The identity provider and the project API both encode capability flags
//! loosely, as `1` or `"1"`. They are turned into real booleans here, once,
//! so nothing downstream ever looks at integer or string truthiness.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::DbId;

/// The resolved caller for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub can_update_data: bool,
    pub email: String,
}

impl Identity {
    /// Fixed identity used on loopback hosts, where no identity provider runs.
    pub fn local_dev() -> Self {
        Self {
            user_id: 1,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            is_admin: true,
            can_update_data: true,
            email: "test.user@local.dev".to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Interpret a loosely typed JSON capability flag.
///
/// Only the integer `1` and the string `"1"` are set. Everything else is
/// unset, including `true`, `"true"`, `null` and other numbers.
pub fn flag_from_json(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1",
        _ => false,
    }
}

/// Interpret a JSON id that may arrive as a number or a numeric string.
/// Zero is not a valid id.
pub fn id_from_json(value: &Value) -> Option<DbId> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}
