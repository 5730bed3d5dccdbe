//! Snapshot of the process environment.
//!
//! The launcher never reads `std::env` directly past startup. Everything that
//! depends on environment variables takes an `Environment`, which tests build
//! by hand.

use std::collections::BTreeMap;

/// How many `REDIRECT_` prefixes Apache may stack on top of a variable.
const MAX_REDIRECT_DEPTH: usize = 2;

/// The executable search path. Never forwarded into a batch script.
const SEARCH_PATH_VAR: &str = "PATH";

/// Immutable name/value view of an environment.
///
/// Backed by a sorted map, so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Builder-style setter, mostly for tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set or override a variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Plain lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Plain lookup, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Lookup honouring Apache's redirect convention.
    ///
    /// For `ABC` this tries `REDIRECT_REDIRECT_ABC`, then `REDIRECT_ABC`, then
    /// `ABC`. The highest one that is defined wins, even if it is empty.
    pub fn get_redirected(&self, key: &str) -> Option<&str> {
        (0..=MAX_REDIRECT_DEPTH)
            .rev()
            .find_map(|depth| self.get(&format!("{}{}", "REDIRECT_".repeat(depth), key)))
    }

    /// Like [`Environment::get_redirected`], with absent mapped to `""`.
    pub fn get_redirected_or_empty(&self, key: &str) -> &str {
        self.get_redirected(key).unwrap_or_default()
    }

    /// All variables, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variables that may be copied into a batch script as `SET` lines.
    pub fn forwardable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, v)| is_forwardable(k, v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Whether a variable can be passed through to DOS.
///
/// The name must be an uppercase letter followed by at least one uppercase
/// letter or underscore, and must not be `PATH`. The value must be non-empty
/// and free of spaces, since `SET` would mangle it otherwise.
pub fn is_forwardable(name: &str, value: &str) -> bool {
    is_dos_var_name(name) && name != SEARCH_PATH_VAR && !value.is_empty() && !value.contains(' ')
}

fn is_dos_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}
