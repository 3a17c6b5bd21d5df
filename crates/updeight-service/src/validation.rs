//! Input validation applied before any service mutation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use updeight_core::error::{UpdeightError, UpdeightResult};

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 255;

static EMAIL_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

pub fn validate_name(field: &str, value: &str) -> UpdeightResult<()> {
    if value.trim().is_empty() {
        return Err(UpdeightError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(UpdeightError::validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> UpdeightResult<()> {
    let pattern = EMAIL_REGEX
        .as_ref()
        .map_err(|e| UpdeightError::Internal(format!("email pattern: {e}")))?;
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(UpdeightError::validation("email is not a valid address"))
    }
}

pub fn validate_password(value: &str, min_length: usize) -> UpdeightResult<()> {
    if value.chars().count() < min_length {
        return Err(UpdeightError::validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("johndoe@email.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "johndoe", "john@", "@email.com", "john doe@email.com", "john@email"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn names_must_have_content() {
        assert!(validate_name("name", "johndoe2002").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn password_length_is_counted_in_chars() {
        assert!(validate_password("secure-pw", 8).is_ok());
        assert!(validate_password("short", 8).is_err());
    }
}
