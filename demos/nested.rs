//! Example demonstrating nested structs and fallback names

use envtag::Unmarshal;

#[derive(Debug, Default, Unmarshal)]
struct Database {
    host: String,

    #[env(default = 5432)]
    port: u16,

    // First set variable wins: DB_USER, DB_USERNAME, DATABASE_USER, DATABASE_USERNAME
    #[env(name = "USER,USERNAME", default = "postgres")]
    user: String,

    #[env(name = "PASS,PASSWORD")]
    password: String,
}

#[derive(Debug, Default, Unmarshal)]
struct Cache {
    url: String,
}

#[derive(Debug, Default, Unmarshal)]
struct Logging {
    #[env(default = "info")]
    level: String,
}

#[derive(Debug, Default, Unmarshal)]
struct Config {
    // Names of nested fields are appended to every name listed here
    #[env(name = "DB_,DATABASE_")]
    database: Database,

    // Absent entirely: stays None
    #[env(name = "CACHE_")]
    cache: Option<Cache>,

    // No name segment of its own: reads LEVEL
    #[env(flatten)]
    logging: Logging,

    #[env(delim = r"\s*;\s*")]
    allowed_origins: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("DATABASE_HOST", "db.internal");
    std::env::set_var("DB_PASSWORD", "hunter2");
    std::env::set_var("LEVEL", "debug");
    std::env::set_var("ALLOWED_ORIGINS", "https://a.example; https://b.example");

    let config: Config = envtag::load()?;

    println!("Database:");
    println!("  Host: {}:{}", config.database.host, config.database.port);
    println!("  User: {}", config.database.user);
    println!("  Password set: {}", !config.database.password.is_empty());
    println!("Cache: {:?}", config.cache);
    println!("Log level: {}", config.logging.level);
    println!("Allowed origins: {:?}", config.allowed_origins);

    Ok(())
}
