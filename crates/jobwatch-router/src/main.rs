//! Jobwatch CLI
//!
//! Starts the HTTP server that receives captured pages and notifies new jobs.

use jobwatch_router::{config::AppConfig, start_server, RouterError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        AppConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: jobwatch --config <path-to-config.toml>");
        eprintln!();
        AppConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Jobwatch - Job listing watcher and notifier");
    println!();
    println!("USAGE:");
    println!("    jobwatch --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    jobwatch --config config/jobwatch.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port: HTTP listener (default 127.0.0.1:3000)");
    println!("    - database_path: SQLite ledger file (default jobwatch.db)");
    println!("    - [extractor]: listing_selector, max_document_bytes");
    println!("    - [notify]: mode (grouped|individual), char_budget, inter_message_delay_ms,");
    println!("      send_timeout_secs, silent, link_base");
    println!("    - [telegram]: bot_token, chat_id, api_base");
    println!("    - [poller]: url, interval_secs, fetch_timeout_secs (optional)");
    println!();
    println!("ENVIRONMENT:");
    println!("    JOBWATCH_TELEGRAM_TOKEN      Overrides telegram.bot_token");
    println!("    JOBWATCH_TELEGRAM_CHAT_ID    Overrides telegram.chat_id");
    println!("    RUST_LOG                     Log filter (default: info)");
    println!();
}
