//! Project list view: filters, the add/edit row state machine, and the
//! reconcile-by-reload loop.
//!
//! [`state::ProjectsView`] is a synchronous state machine with no I/O.
//! [`controller::ProjectsController`] drives it against any
//! [`ProjectsApi`](pmtrack_client::api::ProjectsApi).

pub mod controller;
pub mod display;
pub mod notice;
pub mod settings;
pub mod state;
