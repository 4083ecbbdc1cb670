//! Error types for environment variable decoding

/// Errors that can occur while decoding a value from environment variables.
///
/// Two variants describe absence rather than failure:
/// - [`Error::Missing`] means no candidate variable (and no default) was present.
///   Optional fields swallow it, and a top-level [`crate::parse`] turns it into success.
/// - [`Error::Required`] means a mandatory field had no value.
///
/// Every other variant is a hard error that aborts the whole decode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No candidate variable is present and no default is declared.
    #[error("missing")]
    Missing,

    /// A required field has no value in the environment.
    ///
    /// `names` is the field's candidate variable list joined by
    /// [`crate::ENV_DELIMITER`].
    #[error("{names}: required")]
    Required {
        /// Candidate variable names of the field
        names: String,
    },

    /// A field failed to decode; wraps the underlying error with the field's names.
    #[error("{names}: {source}")]
    Field {
        /// Candidate variable names of the field
        names: String,
        /// Error raised while decoding the field
        source: Box<Error>,
    },

    /// An element of an array or `Vec` failed to decode.
    #[error("at index {index}: {source}")]
    Index {
        /// Position of the element in the split value
        index: usize,
        /// Error raised while decoding the element
        source: Box<Error>,
    },

    /// A present value could not be parsed into the target type.
    #[error("invalid {type_name} value {value:?}: {message}")]
    Parse {
        /// Name of the target type
        type_name: &'static str,
        /// Raw text that failed to parse
        value: String,
        /// Error message from the parser
        message: String,
    },

    /// A fixed-length array received the wrong number of elements.
    #[error("cannot parse array from env, expected {expected} elements but got {actual} for {names}")]
    Length {
        /// Declared array length
        expected: usize,
        /// Number of segments produced by splitting the value
        actual: usize,
        /// Candidate variable names of the value
        names: String,
    },

    /// The delimiter pattern of a field is not a valid regular expression.
    #[error("error splitting: invalid delimiter {pattern:?}: {source}")]
    Delimiter {
        /// Pattern declared with `#[env(delim = "...")]`
        pattern: String,
        /// Compilation error from the regex engine
        source: regex::Error,
    },

    /// A parser registered with [`crate::register_parser`] failed.
    #[error("error in custom parser for type {type_name}: {source}")]
    Parser {
        /// Name of the type the parser is registered for
        type_name: &'static str,
        /// Error returned by the parser
        source: Box<Error>,
    },

    /// The `required` annotation of a field is not a boolean.
    #[error("parsing env-required of {names}: invalid boolean {value:?}")]
    RequiredTag {
        /// Candidate variable names of the field
        names: String,
        /// The annotation text that failed to parse
        value: String,
    },

    /// The target type has no environment representation.
    #[error("kind {kind} not supported")]
    Unsupported {
        /// Description of the unsupported shape
        kind: &'static str,
    },

    /// A value wrapped in [`crate::Json`] is not valid JSON for its type.
    #[error("invalid JSON for {type_name}: {source}")]
    Json {
        /// Name of the target type
        type_name: &'static str,
        /// Error from `serde_json`
        source: serde_json::Error,
    },

    /// Error raised by a user hook such as [`crate::UnmarshalEnv`] or [`crate::ValidateEnv`].
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl Error {
    /// Create an error carrying an arbitrary message, for use in hooks.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(anyhow::anyhow!("{message}"))
    }

    /// Create a parse error for type `T` (used by built-in decoders and generated code)
    #[doc(hidden)]
    pub fn parse_error<T>(value: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            type_name: std::any::type_name::<T>(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create a required-absence error for the given candidate names
    #[doc(hidden)]
    pub fn required(names: impl Into<String>) -> Self {
        Self::Required {
            names: names.into(),
        }
    }

    pub(crate) fn field(names: impl Into<String>, source: Self) -> Self {
        Self::Field {
            names: names.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn at_index(index: usize, source: Self) -> Self {
        Self::Index {
            index,
            source: Box::new(source),
        }
    }

    /// Whether this error, or an error it wraps, is [`Error::Missing`].
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Field { source, .. } | Self::Index { source, .. } | Self::Parser { source, .. } => {
                source.is_missing()
            }
            _ => false,
        }
    }

    /// Whether this error, or an error it wraps, is [`Error::Required`].
    pub fn is_required(&self) -> bool {
        match self {
            Self::Required { .. } => true,
            Self::Field { source, .. } | Self::Index { source, .. } | Self::Parser { source, .. } => {
                source.is_required()
            }
            _ => false,
        }
    }

    /// Whether this error reports an absent value rather than a decoding failure.
    pub fn is_absent(&self) -> bool {
        self.is_missing() || self.is_required()
    }
}
