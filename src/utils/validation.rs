use crate::utils::error::{DashboardError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// local-part "@" domain "." 2-4 個字元的後綴
pub const EMAIL_PATTERN: &str = r"^[\w.-]+@[\w.-]+\.\w{2,4}$";

static EMAIL_REGEX: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(DashboardError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Allowed values: {}", allowed.join(", ")),
    })
}

pub fn validate_required_field(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DashboardError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    let re = EMAIL_REGEX
        .as_ref()
        .map_err(|e| DashboardError::ConfigError {
            message: format!("Invalid email pattern: {}", e),
        })?;

    if !re.is_match(email.trim()) {
        return Err(DashboardError::validation(
            field_name,
            format!("'{}' is not a valid email address", email.trim()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_common_addresses() {
        for email in [
            "example@domain.com",
            "first.last@mail.example.org",
            "a-b_c@x-y.io",
            "  padded@domain.info  ",
        ] {
            assert!(validate_email("email", email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_validate_email_rejects_malformed_addresses() {
        for email in [
            "no-at-sign.com",
            "user@nodot",
            "user@domain.c",
            "user@domain.abcde",
            "user name@domain.com",
            "@domain.com",
            "",
        ] {
            assert!(validate_email("email", email).is_err(), "{email}");
        }
    }

    #[test]
    fn test_email_pattern_compiles() {
        assert!(EMAIL_REGEX.is_ok());
    }

    #[test]
    fn test_validate_required_field() {
        assert!(validate_required_field("name", "Ada").is_ok());
        assert!(validate_required_field("name", "").is_err());
        assert!(validate_required_field("name", "   ").is_err());
    }

    #[test]
    fn test_validate_path_and_one_of() {
        assert!(validate_path("dataset.path", "data/x.csv").is_ok());
        assert!(validate_path("dataset.path", "").is_err());
        assert!(validate_one_of("report.narrative", "live", &["live", "canned"]).is_ok());
        assert!(validate_one_of("report.narrative", "loud", &["live", "canned"]).is_err());
    }
}
