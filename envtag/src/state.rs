//! Resolution context carried through a decode
//!
//! An [`UnmarshalState`] describes one position in the target's type graph:
//! the field it belongs to (absent at the root) and the fully composed
//! environment variable names that may supply its value.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;

use regex::Regex;

use crate::de::parse_bool;
use crate::error::Error;
use crate::registry;
use crate::source::Source;

/// Separator between alternative names in `#[env(name = "...")]`, also used
/// to join candidate names in error messages.
pub const ENV_DELIMITER: &str = ",";

/// Default pattern that splits array and `Vec` values.
pub const DEFAULT_DELIMITER: &str = ",";

/// Name that excludes a field from decoding.
pub const SKIP: &str = "-";

/// Prefix marking a name as absolute: it is never composed with parent names.
pub const ABSOLUTE_MARKER: &str = "^";

/// Static description of a struct field and its `#[env(...)]` annotations.
///
/// Generated by `#[derive(Unmarshal)]` as a `static`, so annotations are
/// parsed once at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    ident: &'static str,
    name: Option<&'static str>,
    default: Option<&'static str>,
    delim: Option<&'static str>,
    required: Option<&'static str>,
    flatten: bool,
}

impl Field {
    /// Describe the field `ident` with no annotations.
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            name: None,
            default: None,
            delim: None,
            required: None,
            flatten: false,
        }
    }

    /// Set the comma-separated variable names (`name = "A,^B"`).
    pub const fn with_name(self, name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..self
        }
    }

    /// Set the value used when no candidate variable is present.
    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Set the regular expression that splits array and `Vec` values.
    pub const fn with_delim(self, delim: &'static str) -> Self {
        Self {
            delim: Some(delim),
            ..self
        }
    }

    /// Override whether the field is required. The text must parse as a boolean.
    pub const fn with_required(self, required: &'static str) -> Self {
        Self {
            required: Some(required),
            ..self
        }
    }

    /// Mark the field as flattened: its own name defaults to the empty string.
    pub const fn flattened(self) -> Self {
        Self {
            flatten: true,
            ..self
        }
    }

    /// Rust identifier of the field.
    pub const fn ident(&self) -> &'static str {
        self.ident
    }

    /// Declared variable names, if any.
    pub const fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Declared default value, if any.
    pub const fn default_value(&self) -> Option<&'static str> {
        self.default
    }

    /// Declared delimiter pattern, if any.
    pub const fn delim(&self) -> Option<&'static str> {
        self.delim
    }

    /// Declared required override, if any.
    pub const fn required(&self) -> Option<&'static str> {
        self.required
    }

    /// Whether the field is flattened into its parent.
    pub const fn is_flatten(&self) -> bool {
        self.flatten
    }

    /// Names declared on this field, before composition with parent names.
    ///
    /// Returns `None` when the field is skipped.
    pub fn declared_names(&self) -> Option<Vec<String>> {
        let raw: Cow<'_, str> = match self.name {
            Some(name) => Cow::Borrowed(name),
            None if self.flatten => Cow::Borrowed(""),
            None => Cow::Owned(self.ident.to_uppercase()),
        };
        if raw == SKIP {
            return None;
        }
        Some(raw.split(ENV_DELIMITER).map(str::to_owned).collect())
    }
}

/// Compose a field's declared names with its parent's candidate names.
///
/// Under a parent each declared name is appended to every parent candidate,
/// and an absolute `^NAME` replaces them all with `NAME`. At the root the
/// declared names are used as written, except that the absolute marker is
/// stripped: `^HOME` reads `HOME`, never a variable literally named `^HOME`.
fn compose(parents: &[String], declared: &[String]) -> Vec<String> {
    if parents.is_empty() {
        return declared
            .iter()
            .map(|name| name.strip_prefix(ABSOLUTE_MARKER).unwrap_or(name).to_owned())
            .collect();
    }

    let mut variables = Vec::with_capacity(parents.len() * declared.len());
    for parent in parents {
        for name in declared {
            match name.strip_prefix(ABSOLUTE_MARKER) {
                // An absolute name shows up once however many parents there are.
                Some(absolute) => {
                    if !variables.iter().any(|variable| variable == absolute) {
                        variables.push(absolute.to_owned());
                    }
                }
                None => variables.push(format!("{parent}{name}")),
            }
        }
    }
    variables
}

/// The state of decoding one value from the environment.
#[derive(Clone)]
pub struct UnmarshalState<'a> {
    field: Option<&'static Field>,
    variables: Vec<String>,
    source: &'a dyn Source,
    read: OnceCell<(String, bool)>,
}

impl<'a> UnmarshalState<'a> {
    /// Root state reading from `source`: no field and no candidate names.
    pub fn root(source: &'a dyn Source) -> Self {
        Self {
            field: None,
            variables: Vec::new(),
            source,
            read: OnceCell::new(),
        }
    }

    /// State of a struct field nested under this state.
    ///
    /// Returns `None` when the field is skipped.
    pub fn for_field(&self, field: &'static Field) -> Option<Self> {
        let declared = field.declared_names()?;
        Some(Self {
            field: Some(field),
            variables: compose(&self.variables, &declared),
            source: self.source,
            read: OnceCell::new(),
        })
    }

    /// This state with `prefix` appended to every candidate name.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let variables = if self.variables.is_empty() {
            vec![prefix.to_owned()]
        } else {
            self.variables
                .iter()
                .map(|variable| format!("{variable}{prefix}"))
                .collect()
        };
        Self {
            field: self.field,
            variables,
            source: self.source,
            read: OnceCell::new(),
        }
    }

    /// State of one element of a split value; reading it yields `text`.
    pub fn element(&self, text: &str) -> Self {
        Self {
            field: self.field,
            variables: self.variables.clone(),
            source: self.source,
            read: OnceCell::from((text.to_owned(), true)),
        }
    }

    /// The field this state belongs to; `None` at the root.
    pub fn field(&self) -> Option<&'static Field> {
        self.field
    }

    /// Candidate variable names in lookup order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The source values are looked up from.
    pub fn source(&self) -> &'a dyn Source {
        self.source
    }

    /// Reads the value of the first present candidate variable, falling back
    /// to the field's default. Returns whether a value or default exists at all.
    ///
    /// The result is cached, so the source is consulted at most once per state.
    pub fn read(&self) -> (&str, bool) {
        let (value, exists) = self.read.get_or_init(|| self.lookup());
        (value.as_str(), *exists)
    }

    /// Like [`read`](Self::read), but absence is [`Error::Missing`].
    pub fn present(&self) -> Result<&str, Error> {
        match self.read() {
            (value, true) => Ok(value),
            (_, false) => Err(Error::Missing),
        }
    }

    fn lookup(&self) -> (String, bool) {
        for name in &self.variables {
            if let Some(value) = self.source.lookup(name) {
                tracing::trace!(variable = %name, "found environment variable");
                return (value, true);
            }
        }
        match self.default_value() {
            Some(default) => {
                tracing::debug!(variables = %self, default, "using default value");
                (default.to_owned(), true)
            }
            None => (String::new(), false),
        }
    }

    /// The default value declared on the field, if any.
    pub fn default_value(&self) -> Option<&'static str> {
        self.field.and_then(Field::default_value)
    }

    /// Whether this value is required, given whether its type appears required
    /// and what the field's `required` annotation says.
    pub fn required(&self, appears_required: bool) -> Result<bool, Error> {
        match self.field.and_then(Field::required) {
            None => Ok(appears_required),
            Some(text) => parse_bool(text).ok_or_else(|| Error::RequiredTag {
                names: self.to_string(),
                value: text.to_owned(),
            }),
        }
    }

    /// The compiled delimiter for this value: the field's `delim` annotation,
    /// else [`DEFAULT_DELIMITER`].
    pub fn delim(&self) -> Result<Regex, Error> {
        let pattern = self
            .field
            .and_then(Field::delim)
            .unwrap_or(DEFAULT_DELIMITER);
        registry::delimiter(pattern)
    }

    /// Splits `text` with this value's delimiter into at most `limit` parts.
    pub fn split(&self, text: &str, limit: Option<usize>) -> Result<Vec<String>, Error> {
        let delim = self.delim()?;
        let parts = match limit {
            Some(limit) => delim.splitn(text, limit).map(str::to_owned).collect(),
            None => delim.split(text).map(str::to_owned).collect(),
        };
        Ok(parts)
    }
}

/// Candidate variable names joined by [`ENV_DELIMITER`].
impl fmt::Display for UnmarshalState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.variables.join(ENV_DELIMITER))
    }
}

impl fmt::Debug for UnmarshalState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmarshalState")
            .field("field", &self.field)
            .field("variables", &self.variables)
            .field("read", &self.read.get())
            .finish_non_exhaustive()
    }
}
