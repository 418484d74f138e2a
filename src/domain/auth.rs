use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(DomainError::Internal(format!("Unknown role '{}'", other))),
        }
    }
}

/// A bearer-token session. `subject_id` is a `users.id` for admins and a
/// `customers.id` for portal customers.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: Uuid,
    pub subject_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn role_round_trips() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Customer.to_string(), "customer");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn session_expiry_is_exclusive() {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            role: Role::Customer,
            created_at: now - Duration::hours(1),
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
