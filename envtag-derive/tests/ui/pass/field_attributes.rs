// Every field-level annotation on a single struct.

use std::collections::HashMap;
use std::time::Duration;

use envtag::Unmarshal;

#[derive(Debug, Default, Unmarshal)]
struct Pool {
    #[env(name = "SIZE", default = 4)]
    size: u32,
    #[env(name = "^POOL_TIMEOUT", default = "30s")]
    timeout: Duration,
}

#[derive(Debug, Default, Unmarshal)]
struct Config {
    #[env(name = "HOST,HOSTNAME")]
    host: String,
    #[env(delim = r"\s+")]
    peers: Vec<String>,
    #[env(required = false)]
    retries: u8,
    #[env(skip)]
    runtime_only: Option<String>,
    #[env(name = "-")]
    also_runtime_only: u64,
    #[env(name = "POOL_")]
    pool: Pool,
    #[env(flatten)]
    extra: Extra,
}

#[derive(Debug, Default, Unmarshal)]
struct Extra {
    region: Option<String>,
}

fn main() {
    let env: HashMap<String, String> = [
        ("HOSTNAME", "db.internal"),
        ("PEERS", "a b  c"),
        ("POOL_TIMEOUT", "1m"),
        ("REGION", "eu-west-1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config: Config = envtag::load_from(&env).unwrap();
    assert_eq!(config.host, "db.internal");
    assert_eq!(config.peers, ["a", "b", "c"]);
    assert_eq!(config.retries, 0);
    assert_eq!(config.runtime_only, None);
    assert_eq!(config.also_runtime_only, 0);
    assert_eq!(config.pool.size, 4);
    assert_eq!(config.pool.timeout, Duration::from_secs(60));
    assert_eq!(config.extra.region.as_deref(), Some("eu-west-1"));
}
