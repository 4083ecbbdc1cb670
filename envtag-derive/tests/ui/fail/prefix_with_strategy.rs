// A type that decodes itself never reads field names, so a prefix is meaningless.

#![allow(dead_code)]

use envtag::Unmarshal;

#[derive(Default, Unmarshal)]
#[env(prefix = "APP_", unmarshal)]
struct Raw(String);

impl envtag::UnmarshalEnv for Raw {
    fn unmarshal_env(&mut self, state: &envtag::UnmarshalState<'_>) -> Result<(), envtag::Error> {
        self.0 = state.present()?.to_string();
        Ok(())
    }
}

fn main() {}
