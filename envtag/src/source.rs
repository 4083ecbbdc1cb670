//! Key/value sources that environment variables are looked up from

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::hash::BuildHasher;

/// A string-keyed lookup of environment values.
///
/// A value that is present but empty is still present: only `None` means the
/// variable is unset.
pub trait Source {
    /// Look up the value of the variable `name`.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
///
/// Values that are not valid Unicode are converted lossily: each invalid
/// sequence becomes `U+FFFD REPLACEMENT CHARACTER`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Source for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl<S: BuildHasher> Source for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Source for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: Source + ?Sized> Source for &T {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
