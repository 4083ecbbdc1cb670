//! Basic usage example

use std::time::Duration;

use envtag::{FromEnv, Unmarshal};

#[derive(Debug, Default, Unmarshal)]
struct Config {
    // Required field: loaded from DATABASE_URL environment variable
    database_url: String,

    // With default value
    #[env(default = "127.0.0.1:8080")]
    server_addr: String,

    // Numeric type
    #[env(default = 10)]
    max_connections: u32,

    // Durations use unit suffixes
    #[env(default = "30s")]
    request_timeout: Duration,

    // Optional: None when unset
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");
    std::env::set_var("REQUEST_TIMEOUT", "1m30s");

    // Load configuration
    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.max_connections);
    println!("  Request Timeout: {:?}", config.request_timeout);
    println!("  Log Level: {:?}", config.log_level);

    Ok(())
}
