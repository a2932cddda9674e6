//! Environment variable helpers shared by the `from_env()` constructors.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Read `var` and parse it, logging and falling back to `default` when the
/// value does not parse. Unset variables yield `default` silently.
pub fn env_or<T: FromStr>(var: &str, default: T) -> T {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(var, value = %raw, "Ignoring unparseable environment override");
                default
            }
        },
        Err(_) => default,
    }
}
