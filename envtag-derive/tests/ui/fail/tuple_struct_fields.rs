// A tuple struct decodes like its field, so it can only have one.

#![allow(dead_code)]

use envtag::Unmarshal;

#[derive(Default, Unmarshal)]
struct Pair(String, u16);

fn main() {}
