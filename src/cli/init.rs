//! taskboard init command implementation
//!
//! Writes a default `taskboard.toml` into the current directory.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct InitReport {
    config: PathBuf,
    overwritten: bool,
}

pub fn run(force: bool, options: OutputOptions) -> Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE);
    let existed = path.exists();
    if existed && !force {
        return Err(Error::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(&path)?;

    let mut human = HumanOutput::new(format!("Wrote {}", path.display()));
    human.push_summary("storage", "tasks.json (file backend)");
    let report = InitReport {
        config: path,
        overwritten: existed,
    };
    emit_success(options, "init", &report, Some(&human))
}
