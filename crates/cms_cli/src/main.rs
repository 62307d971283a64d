//! Command-line entry point.
//!
//! # Responsibility
//! - Read one JSON command from stdin and run it against the database named
//!   by `CMS_DB_PATH` (in-memory when unset).
//! - Print the response envelope as JSON on stdout.
//!
//! `cms_cli --version` prints the core version and exits.

use cms_core::{execute, Command, CoreConfig, Response};
use log::{error, info};
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    if std::env::args().nth(1).as_deref() == Some("--version") {
        println!("cms_core version={}", cms_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = CoreConfig::from_env();
    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    let response = match run(&config) {
        Ok(response) => response,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("cannot encode response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(config: &CoreConfig) -> Result<Response<serde_json::Value>, String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| format!("cannot read stdin: {err}"))?;
    let command: Command =
        serde_json::from_str(&input).map_err(|err| format!("malformed command: {err}"))?;

    let conn = config
        .open_connection()
        .map_err(|err| format!("cannot open database: {err}"))?;
    info!(
        "event=cli_run module=cli status=start op={}",
        command.operation
    );
    Ok(execute(&conn, command))
}
