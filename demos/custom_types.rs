//! Example demonstrating custom decoding: text hooks, registered parsers,
//! JSON values and validation

use std::collections::HashMap;

use envtag::{Error, Json, Unmarshal, UnmarshalState, UnmarshalText, ValidateEnv};
use serde::Deserialize;

/// Parsed from text such as `10MiB`
#[derive(Debug, Default, Unmarshal)]
#[env(text)]
struct ByteSize(u64);

impl UnmarshalText for ByteSize {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        let (digits, scale) = match text {
            t if t.ends_with("GiB") => (&t[..t.len() - 3], 1 << 30),
            t if t.ends_with("MiB") => (&t[..t.len() - 3], 1 << 20),
            t if t.ends_with("KiB") => (&t[..t.len() - 3], 1 << 10),
            t => (t, 1),
        };
        let value: u64 = digits
            .parse()
            .map_err(|e| Error::parse_error::<ByteSize>(text, e))?;
        self.0 = value * scale;
        Ok(())
    }
}

/// Decoded by a parser registered at start-up
#[derive(Debug, Default, Unmarshal)]
struct Level(u8);

fn level(state: &UnmarshalState<'_>) -> Result<Level, Error> {
    match state.present()? {
        "low" => Ok(Level(1)),
        "normal" => Ok(Level(5)),
        "high" => Ok(Level(9)),
        other => Err(Error::custom(format!("unknown level {other:?}"))),
    }
}

#[derive(Debug, Default, Deserialize)]
struct Upstream {
    host: String,
    port: u16,
}

/// Checked after decoding
#[derive(Debug, Default, Unmarshal)]
#[env(validate)]
struct Workers(usize);

impl ValidateEnv for Workers {
    fn validate_env(&self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        if self.0 == 0 || self.0 > 64 {
            return Err(Error::custom(format!("{state} must be between 1 and 64")));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Unmarshal)]
struct Config {
    max_body: ByteSize,
    priority: Level,
    upstreams: Json<Vec<Upstream>>,
    labels: Json<HashMap<String, String>>,
    #[env(default = 4)]
    workers: Workers,
}

fn main() -> anyhow::Result<()> {
    envtag::register_parser::<Level>(level);

    std::env::set_var("MAX_BODY", "10MiB");
    std::env::set_var("PRIORITY", "high");
    std::env::set_var(
        "UPSTREAMS",
        r#"[{"host":"10.0.0.1","port":8080},{"host":"10.0.0.2","port":8080}]"#,
    );
    std::env::set_var("LABELS", r#"{"team":"payments","tier":"web"}"#);

    let config: Config = envtag::load()?;

    println!("Max body: {} bytes", config.max_body.0);
    println!("Priority: {}", config.priority.0);
    for upstream in config.upstreams.iter() {
        println!("Upstream: {}:{}", upstream.host, upstream.port);
    }
    println!("Labels: {:?}", *config.labels);
    println!("Workers: {}", config.workers.0);

    std::env::set_var("WORKERS", "0");
    match envtag::load::<Config>() {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("Rejected: {e}"),
    }

    Ok(())
}
