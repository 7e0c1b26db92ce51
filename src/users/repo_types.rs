use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{error::ValidationError, validation::validate_role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Common,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Common => "common",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_role(s)
    }
}

/// User record as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 hash, never the plaintext
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Fields must already be validated and the password hashed.
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// Current time at the precision Postgres keeps (microseconds).
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let micros = now.nanosecond() / 1_000 * 1_000;
    now.replace_nanosecond(micros).unwrap_or(now)
}

/// Raw row of the `users` table; `role` is parsed into [`Role`] on conversion.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = ValidationError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role.parse()?,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            "Alice Doe".into(),
            "alice@example.com".into(),
            "$argon2id$fake".into(),
            Role::Common,
        )
    }

    #[test]
    fn new_user_is_active_with_equal_timestamps() {
        let user = sample();
        assert!(user.is_active);
        assert!(!user.is_admin());
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.created_at.nanosecond() % 1_000, 0);
    }

    #[test]
    fn deactivate_and_activate_refresh_updated_at() {
        let mut user = sample();
        let created = user.created_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        user.deactivate();
        assert!(!user.is_active);
        assert!(user.updated_at > created);
        user.activate();
        assert!(user.is_active);
        assert_eq!(user.created_at, created);
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "common");
    }

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let user = sample();
        let row = UserRow {
            id: user.id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: "superuser".into(),
            is_active: true,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        assert_eq!(
            User::try_from(row).unwrap_err(),
            ValidationError::RoleInvalid("superuser".into())
        );
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Admin, Role::Common] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert_eq!(Role::default(), Role::Common);
    }
}
