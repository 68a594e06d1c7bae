//! Domain validation rules shared across crates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

/// Usernames reserved for API route aliases.
const RESERVED_USERNAMES: &[&str] = &["me"];

#[allow(clippy::expect_used)]
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,16}$").expect("username pattern is valid"));

/// Validate a candidate username.
///
/// A username must match `^[a-zA-Z0-9_-]{3,16}$` and must not collide with
/// a reserved route alias such as `me`.
pub fn validate_username(value: &str) -> AppResult<()> {
    if !USERNAME_RE.is_match(value) || RESERVED_USERNAMES.contains(&value) {
        return Err(AppError::Validation(format!(
            "Invalid username: <{value}>"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_usernames() {
        assert!(validate_username("abc_99").is_ok());
        assert!(validate_username("chef-anna").is_ok());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("a234567890123456").is_ok());
    }

    #[test]
    fn test_rejects_reserved_me() {
        // "me" is both reserved and too short; a reserved name of valid
        // length must still fail via the reserved list.
        assert!(validate_username("me").is_err());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("a2345678901234567").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_rejects_bad_characters() {
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dot.name").is_err());
        assert!(validate_username("émile").is_err());
    }

    #[test]
    fn test_error_message_embeds_value() {
        let err = validate_username("me").unwrap_err();
        assert!(err.to_string().contains("<me>"));
    }
}
