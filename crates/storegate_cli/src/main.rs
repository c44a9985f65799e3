//! CLI probe for a configured store.
//!
//! # Responsibility
//! - Load `StoreConfig` from the environment and open the store it names.
//! - Print the core version, schema version and per-table row counts.

use log::{error, info};
use std::process::ExitCode;
use storegate_core::{init_logging_from_config, open_db_with_config, StoreConfig, StoreGateway};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_probe module=cli status=error error={message}");
            eprintln!("storegate: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("storegate: logging disabled: {err}");
    }

    let conn = open_db_with_config(&config).map_err(|err| err.to_string())?;
    let gateway = StoreGateway::try_new(&conn).map_err(|err| err.to_string())?;
    let counts = gateway.table_counts().map_err(|err| err.to_string())?;

    let target = config
        .database_path
        .as_deref()
        .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string());
    println!("storegate_core version={}", storegate_core::core_version());
    println!("database={target} schema_version={}", gateway.schema_version());
    for count in &counts {
        println!("{:<16} {}", count.table, count.rows);
    }

    info!(
        "event=cli_probe module=cli status=ok tables={}",
        counts.len()
    );
    Ok(())
}
