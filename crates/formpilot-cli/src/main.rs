//! formpilot - a line-driven shell over the forms client session.
//!
//! Stands in for the browser UI: commands log in, log out and navigate,
//! and each result shows which page would be rendered.

mod app;
mod input;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use formpilot_core::Config;

use app::{App, AppState};
use input::parse_command;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn prompt_password() -> Result<String> {
    Ok(rpassword::prompt_password("Password: ")?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    info!(api = %config.api_base_url, "formpilot starting");

    let mut app = App::new(config)?;
    println!("{}", app.start());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match parse_command(&line) {
            Ok(command) => {
                let output = app.execute(command, prompt_password).await;
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Err(input::ParseError::Empty) => {}
            Err(e) => println!("{}", e),
        }

        if matches!(app.state, AppState::Quitting) {
            break;
        }
    }

    info!("formpilot shutting down");
    Ok(())
}
