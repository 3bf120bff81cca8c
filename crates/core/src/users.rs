//! Admin user-filter options derived from the loaded page.

use std::collections::HashSet;

use crate::project::Project;
use crate::types::DbId;

/// One entry of the admin "User" selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOption {
    pub user_id: DbId,
    pub name: String,
}

/// Distinct owners of `items`, sorted by display name.
///
/// The first row seen for a user supplies its name. Only users present in
/// the current page can appear; there is no separate user directory.
pub fn user_filter_options(items: &[Project]) -> Vec<UserOption> {
    let mut seen = HashSet::new();
    let mut options: Vec<UserOption> = items
        .iter()
        .filter(|p| seen.insert(p.user_id))
        .map(|p| UserOption {
            user_id: p.user_id,
            name: p.owner_name(),
        })
        .collect();

    options.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    options
}
