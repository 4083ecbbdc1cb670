//! Compile-pass tests for the derive macro
//!
//! Each file derives `Unmarshal` for a different shape and checks the result
//! at runtime against an in-memory source.

#[test]
fn ui_tests() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/pass/*.rs");
}
