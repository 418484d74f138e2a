use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::{count_star, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::normalize_email;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    order_number_for, price_items, OrderChanges, OrderFilter, OrderItem, OrderStats, OrderView,
    PlaceOrder, PlacedOrder,
};
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::OrderRepository;
use crate::domain::status::{OrderStatus, PaymentStatus, ServiceStatus};
use crate::schema::{customers, orders, services};

use super::models::{CustomerRow, NewCustomerRow, NewOrderRow, OrderChangesRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Prices `service_ids` against the active catalog.
fn price_services(
    conn: &mut PgConnection,
    service_ids: &[Uuid],
) -> Result<(Vec<OrderItem>, BigDecimal), DomainError> {
    let catalog: Vec<(Uuid, String, BigDecimal)> = services::table
        .filter(services::id.eq_any(service_ids.to_vec()))
        .filter(services::status.eq(ServiceStatus::Active.as_str()))
        .select((services::id, services::name, services::price))
        .load(conn)?;
    price_items(service_ids, &catalog)
}

fn items_json(items: &[OrderItem]) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(items).map_err(|e| DomainError::Internal(e.to_string()))
}

/// `ILIKE` pattern matching `search` anywhere, with its wildcards taken
/// literally. Postgres escapes with a backslash by default.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(email) = &filter.email {
        query = query.filter(orders::customer_email.eq(normalize_email(email)));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        query = query.filter(
            orders::order_number
                .ilike(pattern.clone())
                .or(orders::customer_name.ilike(pattern.clone()))
                .or(orders::customer_email.ilike(pattern)),
        );
    }
    query
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, order: PlaceOrder) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Price the order from the catalog
            let (items, total) = price_services(conn, &order.service_ids)?;

            // 2. Find or create the customer, then roll the order into its totals
            let existing = customers::table
                .filter(customers::email.eq(&order.customer_email))
                .select(CustomerRow::as_select())
                .first::<CustomerRow>(conn)
                .optional()?;
            let customer_id = match existing {
                Some(customer) => customer.id,
                None => {
                    let id = Uuid::new_v4();
                    diesel::insert_into(customers::table)
                        .values(&NewCustomerRow {
                            id,
                            name: order.customer_name.trim().to_string(),
                            email: order.customer_email.clone(),
                            phone: Some(order.customer_phone.trim().to_string()),
                            address: order.shipping_address.clone(),
                            password_hash: None,
                        })
                        .execute(conn)?;
                    id
                }
            };
            let now = Utc::now();
            let customer = diesel::update(customers::table.find(customer_id))
                .set((
                    customers::total_orders.eq(customers::total_orders + 1),
                    customers::total_spent.eq(customers::total_spent + total.clone()),
                    customers::last_order.eq(Some(now)),
                    customers::updated_at.eq(now),
                ))
                .returning(CustomerRow::as_returning())
                .get_result::<CustomerRow>(conn)?;

            // 3. Bump usage of every ordered service
            for service_id in &order.service_ids {
                diesel::update(services::table.find(*service_id))
                    .set(services::usage_count.eq(services::usage_count + 1))
                    .execute(conn)?;
            }

            // 4. Insert the order
            let id = Uuid::new_v4();
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id,
                    order_number: order_number_for(&id),
                    customer_id: Some(customer_id),
                    customer_name: order.customer_name.trim().to_string(),
                    customer_email: order.customer_email.clone(),
                    customer_phone: Some(order.customer_phone.trim().to_string()),
                    status: OrderStatus::Pending.as_str().to_string(),
                    payment_status: PaymentStatus::Pending.as_str().to_string(),
                    priority: order.priority.as_str().to_string(),
                    total_amount: total,
                    items: items_json(&items)?,
                    pickup_date: order.pickup_date,
                    special_instructions: order.special_instructions.clone(),
                    shipping_address: order.shipping_address.clone(),
                })
                .returning(OrderRow::as_returning())
                .get_result::<OrderRow>(conn)?;

            Ok(PlacedOrder {
                order: row.try_into()?,
                customer: customer.into(),
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?
            .map(OrderView::try_from)
            .transpose()
    }

    fn list(&self, filter: &OrderFilter, page: Page) -> Result<ListResult<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load::<OrderRow>(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(OrderView::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut row = OrderChangesRow {
                customer_name: changes.customer_name,
                customer_email: changes.customer_email,
                customer_phone: changes.customer_phone,
                pickup_date: changes.pickup_date,
                special_instructions: changes.special_instructions,
                shipping_address: changes.shipping_address,
                payment_status: changes.payment_status.map(|s| s.as_str().to_string()),
                priority: changes.priority.map(|p| p.as_str().to_string()),
                updated_at: Some(Utc::now()),
                ..Default::default()
            };
            if let Some(service_ids) = &changes.service_ids {
                let (items, total) = price_services(conn, service_ids)?;
                row.items = Some(items_json(&items)?);
                row.total_amount = Some(total);
            }

            diesel::update(orders::table.find(id))
                .set(&row)
                .returning(OrderRow::as_returning())
                .get_result::<OrderRow>(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Order"))?
                .try_into()
        })
    }

    fn set_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(id))
                .filter(orders::status.eq(from.as_str())),
        )
        .set((
            orders::status.eq(to.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .returning(OrderRow::as_returning())
        .get_result::<OrderRow>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => row.try_into(),
            None => {
                let exists: i64 = orders::table
                    .filter(orders::id.eq(id))
                    .count()
                    .get_result(&mut conn)?;
                if exists == 0 {
                    Err(DomainError::NotFound("Order"))
                } else {
                    Err(DomainError::Conflict(format!(
                        "Order is no longer {}",
                        from
                    )))
                }
            }
        }
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn stats(&self) -> Result<OrderStats, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let counts: Vec<(String, i64)> = orders::table
                .group_by(orders::status)
                .select((orders::status, count_star()))
                .load(conn)?;

            let revenue: Option<BigDecimal> = orders::table
                .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
                .select(sum(orders::total_amount))
                .first(conn)?;

            let status_counts = counts
                .into_iter()
                .map(|(status, count)| status.parse::<OrderStatus>().map(|s| (s, count)))
                .collect::<Result<Vec<_>, DomainError>>()?;

            Ok(OrderStats {
                status_counts,
                revenue: revenue.unwrap_or_default(),
            })
        })
    }
}
