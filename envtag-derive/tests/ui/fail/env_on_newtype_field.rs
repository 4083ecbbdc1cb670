// The field of a newtype is named by the struct field that holds the newtype.

#![allow(dead_code)]

use envtag::Unmarshal;

#[derive(Default, Unmarshal)]
struct Port(#[env(name = "PORT")] u16);

fn main() {}
