//! Domain types shared by the project-tracking client crates.
//!
//! Everything here is pure data and validation: identities, project rows,
//! filter selections, drafts, and the values derived from a loaded page.
//! No module in this crate performs I/O.

pub mod draft;
pub mod error;
pub mod filter;
pub mod identity;
pub mod project;
pub mod types;
pub mod users;
