use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::auth::{Role, Session};
use crate::domain::customer::{normalize_email, validate_email, CustomerView, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CustomerRepository, SessionRepository, UserRepository};

impl From<bcrypt::BcryptError> for DomainError {
    fn from(e: bcrypt::BcryptError) -> Self {
        DomainError::Internal(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

pub struct AuthService {
    customers: Arc<dyn CustomerRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

/// Compares the digits of two phone numbers.
fn same_phone(on_file: Option<&str>, given: &str) -> bool {
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();
    matches!(on_file, Some(phone) if !digits(phone).is_empty() && digits(phone) == digits(given))
}

fn invalid_credentials() -> DomainError {
    DomainError::Unauthorized("Invalid credentials".to_string())
}

fn unauthorized() -> DomainError {
    DomainError::Unauthorized("Unauthorized".to_string())
}

impl AuthService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            customers,
            users,
            sessions,
            session_ttl,
            bcrypt_cost,
        }
    }

    /// Registers a portal customer. A customer that was created implicitly by
    /// placing an order (and so has no password yet) is claimed instead.
    pub fn signup(&self, request: SignUp) -> Result<(Session, CustomerView), DomainError> {
        let required = [&request.name, &request.email, &request.phone, &request.password];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(DomainError::missing_fields());
        }
        validate_email(&request.email)?;
        let email = normalize_email(&request.email);
        let hash = bcrypt::hash(&request.password, self.bcrypt_cost)?;

        let customer = match self.customers.credentials_by_email(&email)? {
            Some(existing)
                if existing.password_hash.is_some()
                    || !same_phone(existing.customer.phone.as_deref(), &request.phone) =>
            {
                return Err(DomainError::Conflict("Email exists".to_string()));
            }
            Some(existing) => {
                log::info!("Customer {} claimed their account", email);
                self.customers.set_password(existing.customer.id, hash)?
            }
            None => self.customers.create(NewCustomer {
                name: request.name.trim().to_string(),
                email,
                phone: Some(request.phone.trim().to_string()),
                address: None,
                password_hash: Some(hash),
            })?,
        };
        let session = self.open_session(customer.id, Role::Customer)?;
        Ok((session, customer))
    }

    pub fn login(&self, email: &str, password: &str) -> Result<(Session, CustomerView), DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::missing_fields());
        }
        let credentials = self
            .customers
            .credentials_by_email(&normalize_email(email))?
            .ok_or_else(invalid_credentials)?;
        let Some(hash) = credentials.password_hash.as_deref() else {
            return Err(invalid_credentials());
        };
        if !bcrypt::verify(password, hash)? {
            log::warn!("Failed login for {}", credentials.customer.email);
            return Err(invalid_credentials());
        }
        let session = self.open_session(credentials.customer.id, Role::Customer)?;
        Ok((session, credentials.customer))
    }

    pub fn admin_login(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(DomainError::missing_fields());
        }
        let user = self
            .users
            .find_by_username(username.trim())?
            .ok_or_else(invalid_credentials)?;
        if !bcrypt::verify(password, &user.password_hash)? {
            log::warn!("Failed admin login for {}", user.username);
            return Err(invalid_credentials());
        }
        log::info!("Admin {} logged in", user.username);
        self.open_session(user.id, Role::Admin)
    }

    pub fn logout(&self, token: Uuid) -> Result<(), DomainError> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    /// Resolves a bearer token into a live session of the expected role.
    pub fn authenticate(&self, token: Uuid, role: Role) -> Result<Session, DomainError> {
        let session = self.sessions.find(token)?.ok_or_else(unauthorized)?;
        if session.is_expired(Utc::now()) {
            self.sessions.revoke(token)?;
            return Err(unauthorized());
        }
        if session.role != role {
            return Err(DomainError::Forbidden("Forbidden".to_string()));
        }
        Ok(session)
    }

    pub fn current_customer(&self, token: Uuid) -> Result<CustomerView, DomainError> {
        let session = self.authenticate(token, Role::Customer)?;
        self.customers
            .find_by_id(session.subject_id)?
            .ok_or_else(unauthorized)
    }

    /// Creates the admin account unless it already exists.
    pub fn seed_admin(&self, username: &str, password: &str) -> Result<bool, DomainError> {
        let hash = bcrypt::hash(password, self.bcrypt_cost)?;
        let created = self.users.ensure(username, hash)?;
        if created {
            log::info!("Seeded admin user '{}'", username);
        }
        Ok(created)
    }

    fn open_session(&self, subject_id: Uuid, role: Role) -> Result<Session, DomainError> {
        let now = Utc::now();
        let purged = self.sessions.purge_expired(now)?;
        if purged > 0 {
            log::debug!("Purged {} expired sessions", purged);
        }
        let session = Session {
            token: Uuid::new_v4(),
            subject_id,
            role,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.sessions.create(session.clone())?;
        Ok(session)
    }
}
