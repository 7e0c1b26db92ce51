use lazy_static::lazy_static;
use regex::Regex;

use super::{error::ValidationError, repo_types::Role};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap();
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::NameLength);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailFormat);
    }
    Ok(())
}

/// Only checked on input; the stored hash is never re-validated.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Exact, case-sensitive match against the two role tags.
pub fn validate_role(role: &str) -> Result<Role, ValidationError> {
    match role {
        "admin" => Ok(Role::Admin),
        "common" => Ok(Role::Common),
        other => Err(ValidationError::RoleInvalid(other.to_string())),
    }
}
