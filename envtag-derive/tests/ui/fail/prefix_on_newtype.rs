// A newtype has no field names for a prefix to apply to.

#![allow(dead_code)]

use envtag::Unmarshal;

#[derive(Default, Unmarshal)]
#[env(prefix = "APP_")]
struct Port(u16);

fn main() {}
