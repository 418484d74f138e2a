use std::collections::HashMap;

use chrono::{Datelike, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::logistics::{
    format_uti, DeliveryChanges, DeliveryView, NewDelivery, NewScan, NewShipment, ShipmentView,
    TrackView,
};
use crate::domain::ports::{DeliveryRepository, ShipmentRepository, TrackRepository};
use crate::domain::status::{DeliveryStatus, ShipmentStatus};
use crate::schema::{deliveries, orders, shipment_orders, shipments, tracks};

use super::models::{
    DeliveryChangesRow, DeliveryRow, NewDeliveryRow, NewShipmentRow, NewTrackRow,
    ShipmentOrderRow, ShipmentRow, TrackRow,
};

// ── Deliveries ───────────────────────────────────────────────────────────────

pub struct DieselDeliveryRepository {
    pool: DbPool,
}

impl DieselDeliveryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DeliveryRepository for DieselDeliveryRepository {
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(deliveries::table)
            .values(&NewDeliveryRow {
                id: Uuid::new_v4(),
                order_id: delivery.order_id,
                driver_name: delivery.driver_name.trim().to_string(),
                vehicle_id: delivery.vehicle_id.trim().to_string(),
                status: DeliveryStatus::Pending.as_str().to_string(),
                estimated_delivery: delivery.estimated_delivery,
                route: delivery.route,
            })
            .returning(DeliveryRow::as_returning())
            .get_result::<DeliveryRow>(&mut conn)?
            .try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryView>, DomainError> {
        let mut conn = self.pool.get()?;

        deliveries::table
            .find(id)
            .select(DeliveryRow::as_select())
            .first::<DeliveryRow>(&mut conn)
            .optional()?
            .map(DeliveryView::try_from)
            .transpose()
    }

    fn list(&self) -> Result<Vec<DeliveryView>, DomainError> {
        let mut conn = self.pool.get()?;

        deliveries::table
            .select(DeliveryRow::as_select())
            .order(deliveries::created_at.desc())
            .load::<DeliveryRow>(&mut conn)?
            .into_iter()
            .map(DeliveryView::try_from)
            .collect()
    }

    fn update(&self, id: Uuid, changes: DeliveryChanges) -> Result<DeliveryView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(deliveries::table.find(id))
            .set(&DeliveryChangesRow {
                driver_name: changes.driver_name,
                vehicle_id: changes.vehicle_id,
                status: changes.status.map(|s| s.as_str().to_string()),
                estimated_delivery: changes.estimated_delivery,
                actual_delivery: changes.actual_delivery,
                location: changes.location,
                route: changes.route,
                updated_at: Utc::now(),
            })
            .returning(DeliveryRow::as_returning())
            .get_result::<DeliveryRow>(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Delivery"))?
            .try_into()
    }
}

// ── Shipments ────────────────────────────────────────────────────────────────

pub struct DieselShipmentRepository {
    pool: DbPool,
}

impl DieselShipmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn order_ids_of(
    conn: &mut PgConnection,
    shipment_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, DomainError> {
    let links = shipment_orders::table
        .filter(shipment_orders::shipment_id.eq_any(shipment_ids.to_vec()))
        .select(ShipmentOrderRow::as_select())
        .load::<ShipmentOrderRow>(conn)?;
    let mut by_shipment: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        by_shipment
            .entry(link.shipment_id)
            .or_default()
            .push(link.order_id);
    }
    Ok(by_shipment)
}

impl ShipmentRepository for DieselShipmentRepository {
    fn create(&self, shipment: NewShipment) -> Result<ShipmentView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Every order must exist
            let found: i64 = orders::table
                .filter(orders::id.eq_any(shipment.order_ids.clone()))
                .count()
                .get_result(conn)?;
            if found != shipment.order_ids.len() as i64 {
                return Err(DomainError::invalid("One or more orders are invalid"));
            }

            // 2. Next tracking id
            let created_so_far: i64 = shipments::table.count().get_result(conn)?;
            let uti = format_uti(Utc::now().year(), created_so_far + 1);

            // 3. Insert the shipment and its order links
            let id = Uuid::new_v4();
            let row = diesel::insert_into(shipments::table)
                .values(&NewShipmentRow {
                    id,
                    uti,
                    store_id: shipment.store_id.trim().to_string(),
                    staff_name: shipment.staff_name.trim().to_string(),
                    status: ShipmentStatus::Created.as_str().to_string(),
                    estimated_delivery: shipment.estimated_delivery,
                })
                .returning(ShipmentRow::as_returning())
                .get_result::<ShipmentRow>(conn)?;

            let links: Vec<ShipmentOrderRow> = shipment
                .order_ids
                .iter()
                .map(|order_id| ShipmentOrderRow {
                    shipment_id: id,
                    order_id: *order_id,
                })
                .collect();
            diesel::insert_into(shipment_orders::table)
                .values(&links)
                .execute(conn)?;

            row.into_view(shipment.order_ids.clone())
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ShipmentView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = shipments::table
            .find(id)
            .select(ShipmentRow::as_select())
            .first::<ShipmentRow>(&mut conn)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut order_ids = order_ids_of(&mut conn, &[row.id])?;
        row.into_view(order_ids.remove(&id).unwrap_or_default())
            .map(Some)
    }

    fn list(&self) -> Result<Vec<ShipmentView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = shipments::table
            .select(ShipmentRow::as_select())
            .order(shipments::created_at.desc())
            .load::<ShipmentRow>(&mut conn)?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut order_ids = order_ids_of(&mut conn, &ids)?;

        rows.into_iter()
            .map(|row| {
                let ids = order_ids.remove(&row.id).unwrap_or_default();
                row.into_view(ids)
            })
            .collect()
    }

    fn set_status(
        &self,
        id: Uuid,
        from: ShipmentStatus,
        to: ShipmentStatus,
    ) -> Result<ShipmentView, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            shipments::table
                .filter(shipments::id.eq(id))
                .filter(shipments::status.eq(from.as_str())),
        )
        .set((
            shipments::status.eq(to.as_str()),
            shipments::updated_at.eq(Utc::now()),
        ))
        .returning(ShipmentRow::as_returning())
        .get_result::<ShipmentRow>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => {
                let mut order_ids = order_ids_of(&mut conn, &[id])?;
                row.into_view(order_ids.remove(&id).unwrap_or_default())
            }
            None => match self.find_by_id(id)? {
                Some(_) => Err(DomainError::Conflict(format!("Shipment is no longer {}", from))),
                None => Err(DomainError::NotFound("Shipment")),
            },
        }
    }
}

// ── Tracks ───────────────────────────────────────────────────────────────────

pub struct DieselTrackRepository {
    pool: DbPool,
}

impl DieselTrackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TrackRepository for DieselTrackRepository {
    fn record(&self, scan: NewScan) -> Result<TrackView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(tracks::table)
            .values(&NewTrackRow {
                id: Uuid::new_v4(),
                order_ref: scan.order_ref(),
                worker_name: scan.worker_name.trim().to_string(),
                worker_email: scan.worker_email.trim().to_string(),
                order_status: scan.order_status,
                location: scan.location,
                order_data: scan.order_data,
            })
            .returning(TrackRow::as_returning())
            .get_result::<TrackRow>(&mut conn)?;
        Ok(row.into())
    }

    fn list(&self, order_ref: Option<&str>) -> Result<Vec<TrackView>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = tracks::table.into_boxed();
        if let Some(order_ref) = order_ref {
            query = query.filter(tracks::order_ref.eq(order_ref.to_string()));
        }
        let rows = query
            .select(TrackRow::as_select())
            .order(tracks::scanned_at.desc())
            .load::<TrackRow>(&mut conn)?;
        Ok(rows.into_iter().map(TrackView::from).collect())
    }
}
