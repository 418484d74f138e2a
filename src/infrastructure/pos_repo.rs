use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::TransactionRepository;
use crate::domain::pos::{NewTransaction, TransactionView};
use crate::schema::order_transactions;

use super::models::{NewTransactionRow, TransactionRow};

pub struct DieselTransactionRepository {
    pool: DbPool,
}

impl DieselTransactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TransactionRepository for DieselTransactionRepository {
    fn create(
        &self,
        transaction_number: String,
        transaction: NewTransaction,
    ) -> Result<TransactionView, DomainError> {
        let mut conn = self.pool.get()?;

        let items = serde_json::to_value(&transaction.items)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        diesel::insert_into(order_transactions::table)
            .values(&NewTransactionRow {
                id: Uuid::new_v4(),
                transaction_number,
                total_amount: transaction.total(),
                items,
                payment_method: transaction.payment_method.as_str().to_string(),
                cashier_id: transaction.cashier_id,
            })
            .returning(TransactionRow::as_returning())
            .get_result::<TransactionRow>(&mut conn)?
            .try_into()
    }

    fn list(&self, page: Page) -> Result<ListResult<TransactionView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = order_transactions::table.count().get_result(conn)?;

            let rows = order_transactions::table
                .select(TransactionRow::as_select())
                .order(order_transactions::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load::<TransactionRow>(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(TransactionView::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::DieselTransactionRepository;
    use crate::domain::paging::Page;
    use crate::domain::ports::TransactionRepository;
    use crate::domain::pos::{NewTransaction, TransactionItem};
    use crate::domain::status::PaymentMethod;
    use crate::infrastructure::test_db::setup_db;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn transaction_round_trips_items_and_total() {
        let (_container, pool) = setup_db().await;
        let repo = DieselTransactionRepository::new(pool);

        let created = repo
            .create(
                "TXN-20250910-ABCDEF".to_string(),
                NewTransaction {
                    items: vec![TransactionItem {
                        name: "Saree dry clean".to_string(),
                        quantity: 2,
                        unit_price: BigDecimal::from_str("350.00").unwrap(),
                    }],
                    payment_method: PaymentMethod::Debit,
                    cashier_id: Some("CASH-2".to_string()),
                },
            )
            .expect("create failed");

        assert_eq!(created.total_amount, BigDecimal::from_str("700").unwrap());
        let listed = repo.list(Page::default()).expect("list failed");
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].items[0].quantity, 2);
        assert_eq!(listed.items[0].payment_method, PaymentMethod::Debit);
    }
}
