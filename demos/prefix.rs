//! Example demonstrating prefix attribute

use envtag::{FromEnv, Unmarshal};

#[derive(Debug, Default, Unmarshal)]
#[env(prefix = "MYAPP_")]
struct Config {
    // Environment variables will be prefixed: MYAPP_DATABASE_URL, MYAPP_API_KEY, etc.
    database_url: String,
    api_key: String,

    #[env(default = 8080)]
    port: u16,

    // Absolute names ignore the prefix
    #[env(name = "^HOSTNAME", default = "localhost")]
    hostname: String,

    #[env(required = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables with prefix
    std::env::set_var("MYAPP_DATABASE_URL", "postgres://localhost/db");
    std::env::set_var("MYAPP_API_KEY", "secret-key-123");
    std::env::set_var("MYAPP_PORT", "3000");

    let config = Config::from_env()?;

    println!("Configuration with prefix 'MYAPP_':");
    println!("  Database URL: {}", config.database_url);
    println!("  API Key: {}", config.api_key);
    println!("  Port: {}", config.port);
    println!("  Hostname: {}", config.hostname);
    println!("  Debug: {}", config.debug);

    Ok(())
}
