#![doc(test(attr(deny(warnings))))]

//! Budget Folders keeps a user's budget period and named spending folders in
//! sync with a per-user document store.
//!
//! Every folder mutation is applied locally and immediately written through
//! as a full folder-list update; the budget period is written as a partial
//! document update. Callers pass an explicit [`auth::Session`] to every
//! operation.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod store;
pub mod utils;

pub use errors::{BudgetError, BudgetResult};

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, preferring `RUST_LOG`, then `directive`.
pub fn init_with_filter(directive: Option<&str>) {
    utils::init_tracing(directive);
    tracing::debug!("Budget Folders tracing initialized.");
}
