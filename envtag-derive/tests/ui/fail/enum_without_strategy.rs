// An enum has no fields to decode, so it needs a strategy that decodes it whole.

#![allow(dead_code)]

use envtag::Unmarshal;

#[derive(Default, Unmarshal)]
enum Mode {
    #[default]
    Dev,
    Prod,
}

fn main() {}
