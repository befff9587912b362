//! taskboard serve command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::server::{self, AppState};
use crate::storage;

pub fn run(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or(config.server.bind);
    let state = AppState::new(
        storage::open_store(&config.storage),
        config.tasks.default_sort,
    );

    // Requests are handled one at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime
        .block_on(server::serve(state, &bind))
        .map_err(|err| Error::OperationFailed(format!("{err:#}")))
}
