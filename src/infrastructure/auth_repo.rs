use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::auth::{AdminUser, Session};
use crate::domain::errors::DomainError;
use crate::domain::ports::{SessionRepository, UserRepository};
use crate::schema::{sessions, users};

use super::models::{NewUserRow, SessionRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?;
        Ok(row.map(AdminUser::from))
    }

    fn ensure(&self, username: &str, password_hash: String) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let inserted = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash,
            })
            .on_conflict(users::username)
            .do_nothing()
            .execute(&mut conn)?;
        Ok(inserted > 0)
    }
}

pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for DieselSessionRepository {
    fn create(&self, session: Session) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(sessions::table)
            .values(&SessionRow::from(&session))
            .execute(&mut conn)?;
        Ok(())
    }

    fn find(&self, token: Uuid) -> Result<Option<Session>, DomainError> {
        let mut conn = self.pool.get()?;

        sessions::table
            .find(token)
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .optional()?
            .map(Session::try_from)
            .transpose()
    }

    fn revoke(&self, token: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(sessions::table.find(token)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(sessions::table.filter(sessions::expires_at.lt(now)))
            .execute(&mut conn)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{DieselSessionRepository, DieselUserRepository};
    use crate::domain::auth::{Role, Session};
    use crate::domain::ports::{SessionRepository, UserRepository};
    use crate::infrastructure::test_db::setup_db;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn ensure_never_overwrites_an_admin() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);

        assert!(repo.ensure("admin", "first".to_string()).expect("ensure failed"));
        assert!(!repo.ensure("admin", "second".to_string()).expect("ensure failed"));

        let admin = repo
            .find_by_username("admin")
            .expect("lookup failed")
            .expect("admin should exist");
        assert_eq!(admin.password_hash, "first");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn sessions_can_be_found_and_revoked() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSessionRepository::new(pool);
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            role: Role::Admin,
            created_at: now,
            expires_at: now + Duration::hours(1),
        };

        repo.create(session.clone()).expect("create failed");
        let found = repo.find(session.token).expect("find failed").expect("exists");
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.subject_id, session.subject_id);

        assert!(repo.revoke(session.token).expect("revoke failed"));
        assert!(repo.find(session.token).expect("find failed").is_none());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn purge_removes_only_expired_sessions() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSessionRepository::new(pool);
        let now = Utc::now();
        let session = |expires_at| Session {
            token: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            role: Role::Customer,
            created_at: now - Duration::hours(2),
            expires_at,
        };
        let stale = session(now - Duration::hours(1));
        let live = session(now + Duration::hours(1));
        repo.create(stale.clone()).expect("create failed");
        repo.create(live.clone()).expect("create failed");

        assert_eq!(repo.purge_expired(now).expect("purge failed"), 1);
        assert!(repo.find(stale.token).expect("find failed").is_none());
        assert!(repo.find(live.token).expect("find failed").is_some());
    }
}
