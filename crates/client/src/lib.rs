//! Network side of the project tracker.
//!
//! * [`config`] picks API endpoints from the page location and environment.
//! * [`auth`] resolves the session [`Identity`](pmtrack_core::identity::Identity)
//!   before anything else runs.
//! * [`api`] talks to the project API and folds every failure into
//!   [`ApiFailure`](outcome::ApiFailure).

pub mod api;
pub mod auth;
pub mod config;
pub mod outcome;
pub mod session;
