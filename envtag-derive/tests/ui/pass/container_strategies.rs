// Container-level strategies, prefix and validation.

use std::collections::HashMap;

use envtag::{Error, Unmarshal, UnmarshalEnv, UnmarshalState, UnmarshalText, ValidateEnv};

#[derive(Debug, Default, Unmarshal)]
#[env(unmarshal)]
struct Raw {
    value: Option<String>,
}

impl UnmarshalEnv for Raw {
    fn unmarshal_env(&mut self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        let (value, exists) = state.read();
        self.value = exists.then(|| value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Unmarshal)]
#[env(text, validate)]
struct Hex(u32);

impl UnmarshalText for Hex {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        let digits = text.trim_start_matches("0x");
        self.0 = u32::from_str_radix(digits, 16).map_err(|e| Error::parse_error::<Hex>(text, e))?;
        Ok(())
    }
}

impl ValidateEnv for Hex {
    fn validate_env(&self, state: &UnmarshalState<'_>) -> Result<(), Error> {
        if self.0 == 0 {
            return Err(Error::custom(format!("{state} must not be zero")));
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Unmarshal)]
#[env(from_str)]
enum Format {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format {other:?}")),
        }
    }
}

#[derive(Debug, Default, Unmarshal)]
#[env(prefix = "SVC_")]
struct Service {
    raw: Raw,
    mask: Hex,
    format: Format,
}

fn main() {
    let env: HashMap<String, String> = [("SVC_MASK", "0xff"), ("SVC_FORMAT", "json")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let service: Service = envtag::load_from(&env).unwrap();
    assert_eq!(service.raw.value, None);
    assert_eq!(service.mask, Hex(255));
    assert_eq!(service.format, Format::Json);

    let env: HashMap<String, String> = [("SVC_MASK", "0"), ("SVC_FORMAT", "json")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let err = envtag::load_from::<Service>(&env).unwrap_err();
    assert_eq!(err.to_string(), "SVC_MASK: SVC_MASK must not be zero");
}
