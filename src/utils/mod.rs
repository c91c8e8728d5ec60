//! Shared helpers.
//!
//! This module provides:
//! - Error retriability determination and the retrying request wrapper
//! - Regex compilation for the crate's static patterns

mod retry;

use regex::Regex;

pub(crate) use retry::{is_retriable_error, retry_transient};

/// Compiles a hardcoded regex pattern, panicking if it is invalid.
///
/// Only used for the crate's static patterns, so a failure is a programming
/// error caught by the unit tests of the module that owns the pattern.
pub(crate) fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_regex_unsafe_valid() {
        let re = compile_regex_unsafe(r"^/data/organisms/([0-9]+)$", "test");
        assert!(re.is_match("/data/organisms/5833"));
    }

    #[test]
    #[should_panic(expected = "programming error")]
    fn test_compile_regex_unsafe_invalid() {
        let _ = compile_regex_unsafe(r"([0-9]+", "test");
    }
}
