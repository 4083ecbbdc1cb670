//! Process-wide parser registry and delimiter cache
//!
//! Both tables are written rarely (parsers at start-up, delimiters on first
//! use) and read on every decode.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use regex::Regex;

use crate::error::Error;
use crate::state::UnmarshalState;

/// A parser that decodes a whole value of type `T` from its resolution context.
pub type Parser<T> = fn(&UnmarshalState<'_>) -> Result<T, Error>;

static PARSERS: LazyLock<RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
    LazyLock::new(Default::default);

static DELIMITERS: LazyLock<RwLock<HashMap<String, Regex>>> = LazyLock::new(Default::default);

/// Register `parser` for values of exactly type `T`, replacing any previous one.
///
/// A registered parser takes precedence over the built-in decoding of `T`,
/// but not over `#[env(unmarshal)]`, `#[env(text)]` or `#[env(from_str)]` types.
///
/// ```rust
/// use std::collections::HashMap;
/// use envtag::{Error, UnmarshalState};
///
/// #[derive(Debug, Default, PartialEq, envtag::Unmarshal)]
/// struct Level(u8);
///
/// fn level(state: &UnmarshalState<'_>) -> Result<Level, Error> {
///     match state.present()? {
///         "low" => Ok(Level(1)),
///         "high" => Ok(Level(9)),
///         other => Err(Error::custom(format!("unknown level {other}"))),
///     }
/// }
///
/// envtag::register_parser::<Level>(level);
///
/// let env: HashMap<String, String> = [("LEVEL".to_string(), "high".to_string())].into();
/// #[derive(Debug, Default, envtag::Unmarshal)]
/// struct Config {
///     level: Level,
/// }
/// let config: Config = envtag::load_from(&env).unwrap();
/// assert_eq!(config.level, Level(9));
/// ```
pub fn register_parser<T: 'static>(parser: Parser<T>) {
    PARSERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<T>(), Box::new(parser));
    tracing::debug!(type_name = type_name::<T>(), "registered parser");
}

/// Remove the parser registered for `T`. Returns whether one was registered.
pub fn unregister_parser<T: 'static>() -> bool {
    PARSERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&TypeId::of::<T>())
        .is_some()
}

pub(crate) fn parser<T: 'static>() -> Option<Parser<T>> {
    let parsers = PARSERS.read().unwrap_or_else(PoisonError::into_inner);
    parsers
        .get(&TypeId::of::<T>())?
        .downcast_ref::<Parser<T>>()
        .copied()
}

/// Compile `pattern`, reusing an earlier compilation of the same pattern.
pub(crate) fn delimiter(pattern: &str) -> Result<Regex, Error> {
    if let Some(regex) = DELIMITERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(pattern)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern).map_err(|source| Error::Delimiter {
        pattern: pattern.to_owned(),
        source,
    })?;
    DELIMITERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(pattern.to_owned(), regex.clone());
    Ok(regex)
}
