//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present,
/// so bare `$` characters in URLs survive untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand an optional field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_deref() {
        *value = Some(expand_env(v, field)?);
    }
    Ok(())
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("STORIES_TEST_SIMPLE", "UA-1");
        }
        let result = expand_env("${STORIES_TEST_SIMPLE}", "analytics.property_id").unwrap();
        assert_eq!(result, "UA-1");
        unsafe {
            std::env::remove_var("STORIES_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("STORIES_TEST_UNSET");
        }
        let result = expand_env("${STORIES_TEST_UNSET:-G-DEFAULT}", "analytics.tracking_id").unwrap();
        assert_eq!(result, "G-DEFAULT");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("STORIES_TEST_MISSING");
        }
        let err = expand_env("${STORIES_TEST_MISSING}", "site.publisher_logo").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("STORIES_TEST_MISSING"));
        assert!(err.to_string().contains("site.publisher_logo"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("STORIES_TEST_HOST", "cdn.example.com");
        }
        let result = expand_env("https://${STORIES_TEST_HOST}/logo.png", "site.publisher_logo").unwrap();
        assert_eq!(result, "https://cdn.example.com/logo.png");
        unsafe {
            std::env::remove_var("STORIES_TEST_HOST");
        }
    }

    #[test]
    fn test_url_with_dollar_not_expanded() {
        let result = expand_env("https://example.com/$logo.png", "site.publisher_logo").unwrap();
        assert_eq!(result, "https://example.com/$logo.png");
    }

    #[test]
    fn test_expand_opt_none() {
        let mut value = None;
        expand_opt(&mut value, "analytics.property_id").unwrap();
        assert_eq!(value, None);
    }
}
