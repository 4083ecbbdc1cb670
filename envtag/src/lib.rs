//! Typed configuration from environment variables
//!
//! `envtag` decodes structs from environment variables described by field
//! annotations. Nested structs compose their names, a field may list several
//! fallback names, and types can take over their own decoding.
//!
//! # Features
//!
//! - **Declarative**: `#[derive(Unmarshal)]` with `#[env(...)]` field annotations
//! - **Nested structs**: child names are appended to the parent's names
//! - **Fallback names**: `name = "A,B"` reads `A`, then `B`
//! - **Absolute names**: `name = "^HOME"` ignores every parent prefix
//! - **Defaults and optional fields**: `default = "..."`, `Option<T>`, `required = false`
//! - **Sequences**: arrays and `Vec`s split on a regex delimiter
//! - **Extensible**: custom, text and `FromStr` hooks, registered parsers, validation
//!
//! # Example
//!
//! ```rust
//! use envtag::Unmarshal;
//!
//! #[derive(Debug, Default, Unmarshal)]
//! struct Database {
//!     #[env(name = "URL")]
//!     url: String,
//!     #[env(name = "USER,USERNAME", default = "postgres")]
//!     user: String,
//! }
//!
//! #[derive(Debug, Default, Unmarshal)]
//! struct Config {
//!     #[env(name = "DB_")]
//!     database: Database,
//!     #[env(default = 8080)]
//!     listen_port: u16,
//!     verbose: Option<bool>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! std::env::set_var("DB_URL", "postgres://localhost/app");
//! std::env::set_var("DB_USERNAME", "app");
//!
//! let config: Config = envtag::load()?;
//! assert_eq!(config.database.url, "postgres://localhost/app");
//! assert_eq!(config.database.user, "app");
//! assert_eq!(config.listen_port, 8080);
//! assert_eq!(config.verbose, None);
//! # Ok(())
//! # }
//! ```
//!
//! # Names
//!
//! Without `name`, a field reads the upper-cased field name (`listen_port` →
//! `LISTEN_PORT`).
//! A struct field's names are prefixes for the fields inside it: above,
//! `database.url` reads `DB_URL`. Each alternative of a field is combined with
//! each alternative of its parent, parent first:
//!
//! ```rust
//! # use envtag::Unmarshal;
//! #[derive(Default, Unmarshal)]
//! struct Conn {
//!     #[env(name = "PASS,PASSWORD")]
//!     pass: String,
//! }
//!
//! #[derive(Default, Unmarshal)]
//! struct Config {
//!     // Reads DB_PASS, DB_PASSWORD, DATABASE_PASS, DATABASE_PASSWORD
//!     #[env(name = "DB_,DATABASE_")]
//!     conn: Conn,
//! }
//! ```
//!
//! The first variable that is *set* wins, even when it is set to the empty string.
//!
//! # Field attributes
//!
//! - `#[env(name = "A,B")]`: candidate names; a leading `^` makes a name absolute
//! - `#[env(skip)]` or `#[env(name = "-")]`: leave the field untouched
//! - `#[env(default = "value")]`: text used when no candidate is set
//! - `#[env(delim = "regex")]`: separator for array and `Vec` values (default `,`)
//! - `#[env(required = false)]`: override whether absence is an error
//! - `#[env(flatten)]`: nest a struct without adding a name segment
//!
//! # Container attributes
//!
//! - `#[env(prefix = "APP_")]`: prefix every field name
//! - `#[env(unmarshal)]`: decode through [`UnmarshalEnv`]
//! - `#[env(text)]`: decode through [`UnmarshalText`]
//! - `#[env(from_str)]`: decode through `FromStr`
//! - `#[env(validate)]`: check the decoded value with [`ValidateEnv`]
//!
//! # Missing values
//!
//! Non-`Option` fields are required: when none of their names is set and no
//! default is declared, decoding fails with `NAME: required`. `Option<T>` fields
//! stay `None`. A struct with no values at all is reported as missing to its
//! parent, so an `Option` of a struct is `None` unless one of its fields is set.

extern crate self as envtag;

mod cache;
pub mod de;
mod duration;
mod error;
mod registry;
mod source;
mod state;
mod structs;

pub use cache::{forget, get};
pub use de::{Json, StructDecoder, Unmarshal, UnmarshalEnv, UnmarshalText, ValidateEnv};
pub use envtag_derive::Unmarshal;
pub use error::Error;
pub use registry::{register_parser, unregister_parser, Parser};
pub use source::{ProcessEnv, Source};
pub use state::{Field, UnmarshalState, ABSOLUTE_MARKER, DEFAULT_DELIMITER, ENV_DELIMITER, SKIP};

/// Decode `target` in place from the process environment.
///
/// Fields without a value keep what `target` already holds.
///
/// # Errors
///
/// - Required environment variables are not set
/// - Environment variable values cannot be parsed into target types
/// - A custom hook or validation rejects a value
pub fn parse<T: Unmarshal>(target: &mut T) -> Result<(), Error> {
    parse_from(target, &ProcessEnv)
}

/// Decode `target` in place, looking variables up in `source`.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_from<T: Unmarshal>(target: &mut T, source: &dyn Source) -> Result<(), Error> {
    let state = UnmarshalState::root(source);
    match target.unmarshal(&state) {
        Err(err) if err.is_missing() => {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                "no environment values found"
            );
            Ok(())
        }
        result => result,
    }
}

/// Load a `T` from the process environment.
///
/// # Errors
///
/// Same as [`parse`].
pub fn load<T: Unmarshal + Default>() -> Result<T, Error> {
    load_from(&ProcessEnv)
}

/// Load a `T`, looking variables up in `source`.
///
/// # Errors
///
/// Same as [`parse`].
pub fn load_from<T: Unmarshal + Default>(source: &dyn Source) -> Result<T, Error> {
    let mut value = T::default();
    parse_from(&mut value, source)?;
    Ok(value)
}

/// `Config::from_env()` for every decodable type.
pub trait FromEnv: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Same as [`parse`].
    fn from_env() -> Result<Self, Error>;
}

impl<T: Unmarshal + Default> FromEnv for T {
    fn from_env() -> Result<Self, Error> {
        load()
    }
}
