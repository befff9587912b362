//! taskboard - personal task tracker
//!
//! A small web application for a single user's to-do list, with due dates,
//! priorities, filtering, sorting and an urgency ranking.
//!
//! # Module Organization
//!
//! - `task`: task records and the collection they live in
//! - `urgency`: due-date parsing and urgency scoring
//! - `query`: filter chain and sort keys for the list view
//! - `storage`: JSON file and in-memory task stores
//! - `lock`: file lock and atomic write for the optional hardened store
//! - `server`: axum routes and handlers
//! - `view`: HTML for the list page
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `taskboard.toml`
//! - `output`: human and JSON output for CLI commands
//! - `error`: error types and result aliases

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod query;
pub mod server;
pub mod storage;
pub mod task;
pub mod urgency;
pub mod view;

pub use error::{Error, Result};
