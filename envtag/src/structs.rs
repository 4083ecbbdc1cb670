//! Field-by-field decoding of structs and aggregation of their outcomes

use std::borrow::Cow;

use crate::de::Unmarshal;
use crate::error::Error;
use crate::state::{Field, UnmarshalState};

/// Decodes the fields of a struct one at a time and aggregates the result.
///
/// Used by `#[derive(Unmarshal)]`; hand-written struct impls can use it the
/// same way:
///
/// ```rust
/// use envtag::{Error, Field, StructDecoder, Unmarshal, UnmarshalState};
///
/// #[derive(Default)]
/// struct Endpoint {
///     host: String,
///     port: Option<u16>,
/// }
///
/// impl Unmarshal for Endpoint {
///     fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
///         static HOST: Field = Field::new("host");
///         static PORT: Field = Field::new("port");
///
///         let mut fields = StructDecoder::new(state);
///         fields.field(&mut self.host, &HOST)?;
///         fields.field(&mut self.port, &PORT)?;
///         fields.finish()
///     }
///
///     fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
///         envtag::de::new_default(state)
///     }
/// }
/// ```
#[derive(Debug)]
pub struct StructDecoder<'s, 'a> {
    state: Cow<'s, UnmarshalState<'a>>,
    valid: usize,
    missing: usize,
    required: Option<Error>,
}

impl<'s, 'a> StructDecoder<'s, 'a> {
    /// Decode fields nested directly under `state`.
    pub fn new(state: &'s UnmarshalState<'a>) -> Self {
        Self::from_state(Cow::Borrowed(state))
    }

    /// Decode fields nested under `state` with `prefix` appended to its names.
    pub fn with_prefix(state: &'s UnmarshalState<'a>, prefix: &str) -> Self {
        Self::from_state(Cow::Owned(state.with_prefix(prefix)))
    }

    fn from_state(state: Cow<'s, UnmarshalState<'a>>) -> Self {
        Self {
            state,
            valid: 0,
            missing: 0,
            required: None,
        }
    }

    /// Decode one field into `target`.
    ///
    /// Absence is recorded rather than returned; it only becomes an error in
    /// [`finish`](Self::finish), and only when the field is required.
    ///
    /// # Errors
    ///
    /// - the field's decoding failed on a present value; the error is wrapped
    ///   with the field's candidate names
    /// - the field's `required` annotation is not a boolean
    pub fn field<T: Unmarshal>(&mut self, target: &mut T, field: &'static Field) -> Result<(), Error> {
        let Some(state) = self.state.for_field(field) else {
            tracing::trace!(field = field.ident(), "skipping field");
            return Ok(());
        };

        match target.unmarshal(&state) {
            Ok(()) => self.valid += 1,
            Err(err) if err.is_absent() => {
                if state.required(!T::OPTIONAL)? {
                    if self.required.is_none() {
                        // A nested struct already named the variable that is missing.
                        self.required = Some(if err.is_required() {
                            err
                        } else {
                            Error::required(state.to_string())
                        });
                    }
                } else {
                    tracing::debug!(field = field.ident(), variables = %state, "optional field not set");
                }
                self.missing += 1;
            }
            Err(err) => return Err(Error::field(state.to_string(), err)),
        }
        Ok(())
    }

    /// The struct's overall outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::Required`] for the first required field that was absent
    /// - [`Error::Missing`] when no field decoded and at least one was absent
    pub fn finish(self) -> Result<(), Error> {
        if let Some(err) = self.required {
            return Err(err);
        }
        if self.valid == 0 && self.missing > 0 {
            return Err(Error::Missing);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    static NAME: Field = Field::new("name");
    static PORT: Field = Field::new("port");
    static TIMEOUT: Field = Field::new("timeout").with_required("false");
    static STRICT: Field = Field::new("strict").with_required("true");
    static BROKEN: Field = Field::new("broken").with_required("sometimes");
    static HIDDEN: Field = Field::new("hidden").with_name("-");

    #[derive(Debug, Default)]
    struct Pair {
        name: String,
        port: Option<u16>,
        timeout: u64,
    }

    impl Unmarshal for Pair {
        fn unmarshal(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
            let mut fields = StructDecoder::new(state);
            fields.field(&mut self.name, &NAME)?;
            fields.field(&mut self.port, &PORT)?;
            fields.field(&mut self.timeout, &TIMEOUT)?;
            fields.finish()
        }

        fn unmarshal_new(state: &UnmarshalState<'_>) -> Result<Self, Error> {
            crate::de::new_default(state)
        }
    }

    fn decode(pairs: &[(&str, &str)]) -> Result<Pair, Error> {
        let source = env(pairs);
        let mut pair = Pair::default();
        pair.unmarshal(&UnmarshalState::root(&source))?;
        Ok(pair)
    }

    #[test]
    fn test_all_fields_present() {
        let pair = decode(&[("NAME", "a"), ("PORT", "80"), ("TIMEOUT", "5")]).unwrap();
        assert_eq!(pair.name, "a");
        assert_eq!(pair.port, Some(80));
        assert_eq!(pair.timeout, 5);
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let pair = decode(&[("NAME", "a")]).unwrap();
        assert_eq!(pair.port, None);
        assert_eq!(pair.timeout, 0);
    }

    #[test]
    fn test_required_field_absent() {
        let err = decode(&[("PORT", "80")]).unwrap_err();
        assert!(matches!(&err, Error::Required { names } if names == "NAME"));
    }

    #[test]
    fn test_all_absent_reports_required() {
        let err = decode(&[]).unwrap_err();
        assert_eq!(err.to_string(), "NAME: required");
    }

    #[test]
    fn test_hard_error_names_field() {
        let err = decode(&[("NAME", "a"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"PORT: invalid u16 value "eighty": invalid digit found in string"#
        );
    }

    #[test]
    fn test_only_optional_fields_absent_is_missing() {
        let source = env(&[]);
        let state = UnmarshalState::root(&source);
        let mut port: Option<u16> = None;
        let mut timeout = 0u64;

        let mut fields = StructDecoder::new(&state);
        fields.field(&mut port, &PORT).unwrap();
        fields.field(&mut timeout, &TIMEOUT).unwrap();
        assert!(matches!(fields.finish(), Err(Error::Missing)));
    }

    #[test]
    fn test_required_override_on_option() {
        let source = env(&[]);
        let state = UnmarshalState::root(&source);
        let mut strict: Option<u16> = None;

        let mut fields = StructDecoder::new(&state);
        fields.field(&mut strict, &STRICT).unwrap();
        assert_eq!(fields.finish().unwrap_err().to_string(), "STRICT: required");
    }

    #[test]
    fn test_malformed_required_annotation() {
        let source = env(&[]);
        let state = UnmarshalState::root(&source);
        let mut broken = 0u8;

        let mut fields = StructDecoder::new(&state);
        let err = fields.field(&mut broken, &BROKEN).unwrap_err();
        assert!(matches!(err, Error::RequiredTag { .. }));
    }

    #[test]
    fn test_skipped_field_is_untouched() {
        let source = env(&[("HIDDEN", "x")]);
        let state = UnmarshalState::root(&source);
        let mut hidden = String::from("kept");

        let mut fields = StructDecoder::new(&state);
        fields.field(&mut hidden, &HIDDEN).unwrap();
        assert!(fields.finish().is_ok());
        assert_eq!(hidden, "kept");
    }

    #[test]
    fn test_prefix_applies_to_fields() {
        let source = env(&[("APP_NAME", "svc")]);
        let state = UnmarshalState::root(&source);
        let mut name = String::new();

        let mut fields = StructDecoder::with_prefix(&state, "APP_");
        fields.field(&mut name, &NAME).unwrap();
        fields.finish().unwrap();
        assert_eq!(name, "svc");
    }
}
