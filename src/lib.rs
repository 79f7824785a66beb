//! Budgetly: a personal budgeting core.
//!
//! - **Budget Ledger** ([`ledger`]): one active budget per owner and the
//!   balance adjustments made against it.
//! - **Transaction Recorder** ([`recorder`]): expenses and income, each
//!   written together with its effect on the budget balance.
//! - **Category Catalog** ([`catalog`]): global categories and per-owner
//!   subscriptions.
//!
//! All three are `impl` blocks on [`Database`], so an inbound adapter only
//! needs a `Database` and an owner id.

pub mod catalog;
pub mod config;
pub mod db;
mod error;
pub mod export;
pub mod format;
pub mod ledger;
pub mod models;
pub mod money;
pub mod recorder;

pub use db::Database;
pub use error::{Error, Result};
