//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::output::OutputOptions;

mod init;
mod serve;
mod task;

/// taskboard - personal task tracker
///
/// Serves the task list over HTTP and offers the same operations from the
/// command line.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./taskboard.toml when present)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Task file, overriding `storage.path` and selecting the file backend
    #[arg(long, global = true, env = "TASKBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address to listen on (overrides `server.bind`)
        #[arg(long)]
        bind: Option<String>,
    },

    /// List tasks through the filter and sort pipeline
    List {
        /// Priority to match, case-insensitive, or "all"
        #[arg(long, default_value = "all")]
        priority: String,

        /// all, active, completed
        #[arg(long, default_value = "all")]
        status: String,

        /// all, overdue, today, upcoming, no_date
        #[arg(long, default_value = "all")]
        due: String,

        /// urgency, due_date, due_date_desc, priority, priority_desc,
        /// description, description_desc, date_added, date_added_desc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Add a task
    Add {
        /// What needs doing
        description: String,

        /// High, Medium or Low
        #[arg(long)]
        priority: Option<String>,

        /// Due date, e.g. 2024-07-01 or 2024-07-01T17:00
        #[arg(long)]
        due: Option<String>,
    },

    /// Toggle a task between done and not done
    Complete {
        /// Task id
        id: u64,
    },

    /// Replace a task's description, priority and due date
    Edit {
        /// Task id
        id: u64,

        /// New description
        description: String,

        /// New priority (omit to keep the current one)
        #[arg(long)]
        priority: Option<String>,

        /// New due date (omit to clear it)
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: u64,
    },

    /// Write a default taskboard.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Log filter used when RUST_LOG is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Commands::Serve { .. } => "info",
            _ => "off",
        }
    }

    pub fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let config_path = self.config;
        let data = self.data;
        let load = || load_config(config_path.as_deref(), data.as_deref());

        match self.command {
            Commands::Init { force } => init::run(force, options),
            Commands::Serve { bind } => serve::run(load()?, bind),
            Commands::List {
                priority,
                status,
                due,
                sort,
            } => task::run_list(
                &load()?,
                task::ListOptions {
                    priority,
                    status,
                    due,
                    sort,
                },
                options,
            ),
            Commands::Add {
                description,
                priority,
                due,
            } => task::run_add(&load()?, description, priority, due, options),
            Commands::Complete { id } => task::run_complete(&load()?, id, options),
            Commands::Edit {
                id,
                description,
                priority,
                due,
            } => task::run_edit(&load()?, id, description, priority, due, options),
            Commands::Delete { id } => task::run_delete(&load()?, id, options),
        }
    }
}

fn load_config(config_path: Option<&Path>, data: Option<&Path>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(&std::env::current_dir()?)?,
    };
    if let Some(data) = data {
        config.storage.backend = StorageBackend::File;
        config.storage.path = data.to_path_buf();
    }
    Ok(config)
}
