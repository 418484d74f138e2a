use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::paging::{ListResult, Page};
use crate::domain::pos::{transaction_number, NewTransaction, TransactionView};
use crate::domain::ports::TransactionRepository;

pub struct PosService {
    repo: Arc<dyn TransactionRepository>,
}

impl PosService {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub fn record_sale(&self, transaction: NewTransaction) -> Result<TransactionView, DomainError> {
        transaction.validate()?;
        let number = transaction_number(Utc::now(), &Uuid::new_v4());
        let recorded = self.repo.create(number, transaction)?;
        log::info!(
            "Recorded {} ({}, {})",
            recorded.transaction_number,
            recorded.payment_method,
            recorded.total_amount
        );
        Ok(recorded)
    }

    pub fn list_sales(&self, page: Page) -> Result<ListResult<TransactionView>, DomainError> {
        self.repo.list(page)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::pos::TransactionItem;
    use crate::domain::status::PaymentMethod;
    use crate::testing::InMemoryStore;

    #[test]
    fn total_is_computed_server_side() {
        let svc = PosService::new(InMemoryStore::seeded());
        let sale = svc
            .record_sale(NewTransaction {
                items: vec![TransactionItem {
                    name: "Shirt press".to_string(),
                    quantity: 4,
                    unit_price: BigDecimal::from_str("25.50").unwrap(),
                }],
                payment_method: PaymentMethod::Mobile,
                cashier_id: Some("CASH-1".to_string()),
            })
            .unwrap();
        assert_eq!(sale.total_amount, BigDecimal::from_str("102.00").unwrap());
        assert!(sale.transaction_number.starts_with("TXN-"));
        assert_eq!(svc.list_sales(Page::default()).unwrap().total, 1);
    }
}
