//! Decoding of values from environment variables
//!
//! Every decodable type implements [`Unmarshal`]. For each type exactly one
//! strategy applies, in this order of precedence:
//!
//! 1. custom decoding through [`UnmarshalEnv`] (or a hand-written [`Unmarshal`]),
//! 2. text decoding through [`UnmarshalText`] (or `FromStr` with `#[env(from_str)]`),
//! 3. a parser registered with [`register_parser`](crate::register_parser),
//! 4. the built-in decoding of the type's shape.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::duration::parse_duration;
use crate::error::Error;
use crate::registry;
use crate::state::UnmarshalState;

pub use crate::structs::StructDecoder;

/// A type that can be decoded in place from environment variables.
///
/// Usually derived with `#[derive(Unmarshal)]`. Implementing it by hand gives
/// the type full control over its decoding.
pub trait Unmarshal: 'static {
    /// Whether absence of a value is acceptable when the field carries no
    /// `required` annotation. Only `Option<T>` is optional by default.
    const OPTIONAL: bool = false;

    /// Decode `self` from the value(s) described by `state`.
    ///
    /// # Errors
    ///
    /// - [`Error::Missing`] when no value is present
    /// - [`Error::Required`] when a nested required value is absent
    /// - any other variant when a present value cannot be decoded
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error>;

    /// Build a fresh value from `state`.
    ///
    /// Used where there is no existing value to decode into: `None` options,
    /// sequence elements and array elements. Types with a [`Default`] can
    /// implement it with [`new_default`].
    ///
    /// # Errors
    ///
    /// Same as [`unmarshal`](Self::unmarshal).
    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error>
    where
        Self: Sized;
}

/// Build a `T` by decoding into `T::default()`.
///
/// # Errors
///
/// Same as [`Unmarshal::unmarshal`].
pub fn new_default<T: Unmarshal + Default>(state: &UnmarshalState<'_>) -> Result<T, Error> {
    let mut value = T::default();
    value.unmarshal(state)?;
    Ok(value)
}

/// Custom decoding given the full resolution context.
///
/// Enable with `#[env(unmarshal)]` on a `#[derive(Unmarshal)]` type. The hook is
/// responsible for reading the environment itself, e.g. with
/// [`UnmarshalState::read`].
pub trait UnmarshalEnv {
    /// Decode `self` from `state`.
    fn unmarshal_env(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error>;
}

/// Decoding from raw text.
///
/// Enable with `#[env(text)]` on a `#[derive(Unmarshal)]` type. The hook only
/// runs when a value is present.
pub trait UnmarshalText {
    /// Decode `self` from `text`.
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error>;
}

/// Validation run after a successful decode.
///
/// Enable with `#[env(validate)]` on a `#[derive(Unmarshal)]` type.
pub trait ValidateEnv {
    /// Reject the decoded value by returning an error.
    fn validate_env(&self, state: &UnmarshalState<'_>) -> Result<(), Error>;
}

/// Run the registered parser for `T` if there is one, else `builtin`.
///
/// Used by built-in impls and generated code.
#[doc(hidden)]
pub fn decode_registered<T, F>(
    target: &mut T,
    state: &UnmarshalState<'_>,
    builtin: F,
) -> Result<(), Error>
where
    T: Unmarshal,
    F: FnOnce(&mut T, &UnmarshalState<'_>) -> Result<(), Error>,
{
    match registry::parser::<T>() {
        Some(parser) => {
            *target = run_parser(parser, state)?;
            Ok(())
        }
        None => builtin(target, state),
    }
}

/// Like [`decode_registered`], for building a fresh value.
#[doc(hidden)]
pub fn new_registered<T, F>(state: &UnmarshalState<'_>, builtin: F) -> Result<T, Error>
where
    T: Unmarshal,
    F: FnOnce(&UnmarshalState<'_>) -> Result<T, Error>,
{
    match registry::parser::<T>() {
        Some(parser) => run_parser(parser, state),
        None => builtin(state),
    }
}

fn run_parser<T: 'static>(parser: registry::Parser<T>, state: &UnmarshalState<'_>) -> Result<T, Error> {
    tracing::trace!(type_name = type_name::<T>(), variables = %state, "using registered parser");
    parser(state).map_err(|err| Error::Parser {
        type_name: type_name::<T>(),
        source: Box::new(err),
    })
}

/// Decode through [`UnmarshalText`] once a value is known to be present.
#[doc(hidden)]
pub fn decode_text<T: UnmarshalText>(
    target: &mut T,
    state: &UnmarshalState<'_>,
) -> Result<(), Error> {
    let text = state.present()?;
    target.unmarshal_text(text)
}

/// Decode using `FromStr`
#[doc(hidden)]
pub fn decode_from_str<T>(target: &mut T, state: &UnmarshalState<'_>) -> Result<(), Error>
where
    T: FromStr,
    T::Err: Display,
{
    *target = new_from_str(state)?;
    Ok(())
}

/// Build a value using `FromStr`
#[doc(hidden)]
pub fn new_from_str<T>(state: &UnmarshalState<'_>) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    let text = state.present()?;
    text.parse::<T>()
        .map_err(|e| Error::parse_error::<T>(text, e))
}

/// Unsigned parsing that, unlike `FromStr`, refuses an explicit `+` sign.
fn new_unsigned<T>(state: &UnmarshalState<'_>) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    let text = state.present()?;
    if text.starts_with('+') {
        return Err(Error::parse_error::<T>(text, "invalid digit found in string"));
    }
    text.parse::<T>()
        .map_err(|e| Error::parse_error::<T>(text, e))
}

/// Parse a boolean, accepting `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

macro_rules! impl_parsed {
    ($parse:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Unmarshal for $ty {
                fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
                    *self = Self::unmarshal_new(state)?;
                    Ok(())
                }

                fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
                    new_registered(state, $parse)
                }
            }
        )*
    };
}

impl_parsed!(new_from_str =>
    String, char, i8, i16, i32, i64, i128, isize, f32, f64,
    PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl_parsed!(new_unsigned => u8, u16, u32, u64, u128, usize);

fn new_bool(state: &UnmarshalState<'_>) -> Result<bool, Error> {
    let text = state.present()?;
    parse_bool(text).ok_or_else(|| Error::parse_error::<bool>(text, "expected a boolean"))
}

fn new_duration(state: &UnmarshalState<'_>) -> Result<Duration, Error> {
    let text = state.present()?;
    parse_duration(text).map_err(|e| Error::parse_error::<Duration>(text, e))
}

impl_parsed!(new_bool => bool);
impl_parsed!(new_duration => Duration);

impl<T: Unmarshal> Unmarshal for Option<T> {
    const OPTIONAL: bool = true;

    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |target, state| {
            if let Some(inner) = target.as_mut() {
                return inner.unmarshal(state);
            }
            // Only commit once the inner value decoded successfully.
            *target = Some(T::unmarshal_new(state)?);
            Ok(())
        })
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_registered(state, |state| T::unmarshal_new(state).map(Some))
    }
}

impl<T: Unmarshal> Unmarshal for Box<T> {
    const OPTIONAL: bool = T::OPTIONAL;

    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |target, state| (**target).unmarshal(state))
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_registered(state, |state| T::unmarshal_new(state).map(Box::new))
    }
}

/// Split a present value into exactly `n` segments.
fn split_exact(state: &UnmarshalState<'_>, n: usize) -> Result<Vec<String>, Error> {
    let text = state.present()?;
    let segments = state.split(text, Some(n))?;
    if segments.len() != n {
        return Err(Error::Length {
            expected: n,
            actual: segments.len(),
            names: state.to_string(),
        });
    }
    Ok(segments)
}

impl<T: Unmarshal, const N: usize> Unmarshal for [T; N] {
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |target, state| {
            let segments = split_exact(state, N)?;
            for (index, (slot, segment)) in target.iter_mut().zip(&segments).enumerate() {
                slot.unmarshal(&state.element(segment))
                    .map_err(|err| Error::at_index(index, err))?;
            }
            Ok(())
        })
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_registered(state, |state| {
            let values = split_exact(state, N)?
                .iter()
                .enumerate()
                .map(|(index, segment)| {
                    T::unmarshal_new(&state.element(segment))
                        .map_err(|err| Error::at_index(index, err))
                })
                .collect::<Result<Vec<T>, Error>>()?;
            values.try_into().map_err(|values: Vec<T>| Error::Length {
                expected: N,
                actual: values.len(),
                names: state.to_string(),
            })
        })
    }
}

impl<T: Unmarshal> Unmarshal for Vec<T> {
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |target, state| {
            let text = state.present()?;
            // Present but empty: no elements, not one empty element.
            if text.is_empty() {
                return Ok(());
            }
            let segments = state.split(text, None)?;
            let mut values = Vec::with_capacity(segments.len());
            for (index, segment) in segments.iter().enumerate() {
                let value = T::unmarshal_new(&state.element(segment))
                    .map_err(|err| Error::at_index(index, err))?;
                values.push(value);
            }
            *target = values;
            Ok(())
        })
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_default(state)
    }
}

impl<K: 'static, V: 'static, S: 'static> Unmarshal for HashMap<K, V, S> {
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |_, _| Err(Error::Unsupported { kind: "map" }))
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_registered(state, |_| Err(Error::Unsupported { kind: "map" }))
    }
}

impl<K: 'static, V: 'static> Unmarshal for BTreeMap<K, V> {
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_registered(self, state, |_, _| Err(Error::Unsupported { kind: "map" }))
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        new_registered(state, |_| Err(Error::Unsupported { kind: "map" }))
    }
}

/// A value stored as JSON text in a single variable.
///
/// Useful for shapes that have no plain environment representation, such as maps:
///
/// ```rust
/// use std::collections::HashMap;
/// use envtag::{Json, Unmarshal};
///
/// #[derive(Debug, Default, Unmarshal)]
/// struct Config {
///     #[env(name = "LABELS")]
///     labels: Json<HashMap<String, String>>,
/// }
///
/// # fn main() -> Result<(), envtag::Error> {
/// let env: HashMap<String, String> = [("LABELS".to_string(), r#"{"tier":"web"}"#.to_string())].into();
/// let config: Config = envtag::load_from(&env)?;
/// assert_eq!(config.labels["tier"], "web");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(text).map_err(|source| Error::Json {
        type_name: type_name::<T>(),
        source,
    })
}

impl<T: DeserializeOwned> UnmarshalText for Json<T> {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        self.0 = parse_json(text)?;
        Ok(())
    }
}

impl<T: DeserializeOwned + 'static> Unmarshal for Json<T> {
    fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        decode_text(self, state)
    }

    fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
        parse_json(state.present()?).map(Json)
    }
}
