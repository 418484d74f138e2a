use std::sync::Arc;

use uuid::Uuid;

use crate::domain::customer::{normalize_email, CustomerChanges, CustomerView, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::CustomerRepository;

pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    pub fn create_customer(&self, mut customer: NewCustomer) -> Result<CustomerView, DomainError> {
        customer.validate()?;
        customer.email = normalize_email(&customer.email);
        if self.repo.credentials_by_email(&customer.email)?.is_some() {
            return Err(DomainError::Conflict("Email exists".to_string()));
        }
        self.repo.create(customer)
    }

    pub fn get_customer(&self, id: Uuid) -> Result<CustomerView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Customer"))
    }

    pub fn list_customers(&self, page: Page) -> Result<ListResult<CustomerView>, DomainError> {
        self.repo.list(page)
    }

    pub fn all_customers(&self) -> Result<Vec<CustomerView>, DomainError> {
        let mut page = Page::new(1, Page::MAX_LIMIT);
        let mut customers = Vec::new();
        loop {
            let batch = self.repo.list(page)?;
            let fetched = batch.items.len() as i64;
            customers.extend(batch.items);
            if fetched < page.limit || customers.len() as i64 >= batch.total {
                return Ok(customers);
            }
            page = Page::new(page.page + 1, page.limit);
        }
    }

    pub fn update_customer(
        &self,
        id: Uuid,
        mut changes: CustomerChanges,
    ) -> Result<CustomerView, DomainError> {
        changes.validate()?;
        changes.email = changes.email.as_deref().map(normalize_email);
        self.repo.update(id, changes)
    }

    /// Orders keep their contact snapshot; only the link to the customer goes.
    pub fn delete_customer(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Customer"));
        }
        log::info!("Deleted customer {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Priya Nair".to_string(),
            email: email.to_string(),
            phone: Some("9000000001".to_string()),
            address: None,
            password_hash: None,
        }
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let svc = CustomerService::new(InMemoryStore::seeded());
        svc.create_customer(new_customer("priya@example.com")).unwrap();
        let err = svc.create_customer(new_customer("PRIYA@example.com")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref msg) if msg == "Email exists"));
    }

    #[test]
    fn deleting_unknown_customer_is_not_found() {
        let svc = CustomerService::new(InMemoryStore::seeded());
        assert!(matches!(
            svc.delete_customer(Uuid::new_v4()),
            Err(DomainError::NotFound("Customer"))
        ));
    }

    #[test]
    fn all_customers_walks_every_page() {
        let svc = CustomerService::new(InMemoryStore::seeded());
        for i in 0..105 {
            svc.create_customer(new_customer(&format!("c{}@example.com", i))).unwrap();
        }
        assert_eq!(svc.all_customers().unwrap().len(), 105);
    }
}
