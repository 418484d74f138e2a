use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::{CustomerChanges, CustomerCredentials, CustomerView, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::CustomerRepository;
use crate::schema::customers;

use super::models::{CustomerChangesRow, CustomerRow, NewCustomerRow};

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for DieselCustomerRepository {
    fn create(&self, customer: NewCustomer) -> Result<CustomerView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(customers::table)
            .values(&NewCustomerRow {
                id: Uuid::new_v4(),
                name: customer.name.trim().to_string(),
                email: customer.email,
                phone: customer.phone,
                address: customer.address,
                password_hash: customer.password_hash,
            })
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first::<CustomerRow>(&mut conn)
            .optional()?;
        Ok(row.map(CustomerView::from))
    }

    fn credentials_by_email(&self, email: &str) -> Result<Option<CustomerCredentials>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .filter(customers::email.eq(email))
            .select(CustomerRow::as_select())
            .first::<CustomerRow>(&mut conn)
            .optional()?;
        Ok(row.map(|row| CustomerCredentials {
            password_hash: row.password_hash.clone(),
            customer: row.into(),
        }))
    }

    fn set_password(&self, id: Uuid, password_hash: String) -> Result<CustomerView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(customers::table.find(id))
            .set((
                customers::password_hash.eq(Some(password_hash)),
                customers::updated_at.eq(Utc::now()),
            ))
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(&mut conn)
            .optional()?
            .map(CustomerView::from)
            .ok_or(DomainError::NotFound("Customer"))
    }

    fn list(&self, page: Page) -> Result<ListResult<CustomerView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = customers::table.count().get_result(conn)?;

            let rows = customers::table
                .select(CustomerRow::as_select())
                .order(customers::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load::<CustomerRow>(conn)?;

            Ok(ListResult {
                items: rows.into_iter().map(CustomerView::from).collect(),
                total,
            })
        })
    }

    fn update(&self, id: Uuid, changes: CustomerChanges) -> Result<CustomerView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(customers::table.find(id))
            .set(&CustomerChangesRow {
                name: changes.name.map(|n| n.trim().to_string()),
                email: changes.email,
                phone: changes.phone,
                address: changes.address,
                updated_at: Utc::now(),
            })
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(&mut conn)
            .optional()?
            .map(CustomerView::from)
            .ok_or(DomainError::NotFound("Customer"))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(customers::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::DieselCustomerRepository;
    use crate::domain::customer::{CustomerChanges, NewCustomer};
    use crate::domain::errors::DomainError;
    use crate::domain::paging::Page;
    use crate::domain::ports::CustomerRepository;
    use crate::infrastructure::test_db::setup_db;

    fn make_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Jane Smith".to_string(),
            email: email.to_string(),
            phone: Some("9876543211".to_string()),
            address: None,
            password_hash: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn duplicate_email_maps_to_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCustomerRepository::new(pool);

        repo.create(make_customer("jane@example.com")).expect("create failed");
        let err = repo
            .create(make_customer("jane@example.com"))
            .expect_err("duplicate should fail");

        assert!(matches!(err, DomainError::Conflict(ref msg) if msg == "Email exists"));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn set_password_is_visible_through_credentials() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCustomerRepository::new(pool);
        let customer = repo.create(make_customer("jane@example.com")).expect("create failed");
        assert!(!customer.has_password);

        repo.set_password(customer.id, "$2b$04$hash".to_string())
            .expect("set_password failed");
        let creds = repo
            .credentials_by_email("jane@example.com")
            .expect("lookup failed")
            .expect("customer should exist");

        assert_eq!(creds.password_hash.as_deref(), Some("$2b$04$hash"));
        assert!(creds.customer.has_password);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn update_list_and_delete() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCustomerRepository::new(pool);
        let customer = repo.create(make_customer("jane@example.com")).expect("create failed");
        repo.create(make_customer("john@example.com")).expect("create failed");

        let updated = repo
            .update(
                customer.id,
                CustomerChanges {
                    phone: Some("9000000000".to_string()),
                    ..Default::default()
                },
            )
            .expect("update failed");
        assert_eq!(updated.phone.as_deref(), Some("9000000000"));

        assert_eq!(repo.list(Page::new(1, 1)).expect("list failed").total, 2);
        assert!(repo.delete(customer.id).expect("delete failed"));
        assert!(!repo.delete(customer.id).expect("delete failed"));
    }
}
