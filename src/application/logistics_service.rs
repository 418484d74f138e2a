use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::logistics::{
    plan_delivery_update, DeliveryChanges, DeliveryView, NewDelivery, NewScan, NewShipment,
    ShipmentView, TrackView,
};
use crate::domain::ports::{DeliveryRepository, ShipmentRepository, TrackRepository};

pub struct LogisticsService {
    deliveries: Arc<dyn DeliveryRepository>,
    shipments: Arc<dyn ShipmentRepository>,
    tracks: Arc<dyn TrackRepository>,
}

impl LogisticsService {
    pub fn new(
        deliveries: Arc<dyn DeliveryRepository>,
        shipments: Arc<dyn ShipmentRepository>,
        tracks: Arc<dyn TrackRepository>,
    ) -> Self {
        Self {
            deliveries,
            shipments,
            tracks,
        }
    }

    pub fn list_deliveries(&self) -> Result<Vec<DeliveryView>, DomainError> {
        self.deliveries.list()
    }

    pub fn get_delivery(&self, id: Uuid) -> Result<DeliveryView, DomainError> {
        self.deliveries
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Delivery"))
    }

    pub fn create_delivery(&self, delivery: NewDelivery) -> Result<DeliveryView, DomainError> {
        delivery.validate()?;
        self.deliveries.create(delivery)
    }

    pub fn update_delivery(
        &self,
        id: Uuid,
        changes: DeliveryChanges,
    ) -> Result<DeliveryView, DomainError> {
        let current = self.get_delivery(id)?;
        let changes = plan_delivery_update(&current, changes, Utc::now())?;
        self.deliveries.update(id, changes)
    }

    pub fn list_shipments(&self) -> Result<Vec<ShipmentView>, DomainError> {
        self.shipments.list()
    }

    pub fn get_shipment(&self, id: Uuid) -> Result<ShipmentView, DomainError> {
        self.shipments
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Shipment"))
    }

    pub fn create_shipment(&self, mut shipment: NewShipment) -> Result<ShipmentView, DomainError> {
        shipment.validate()?;
        shipment.order_ids = shipment.distinct_order_ids();
        let created = self.shipments.create(shipment)?;
        log::info!(
            "Created shipment {} with {} packages",
            created.uti,
            created.package_count()
        );
        Ok(created)
    }

    pub fn advance_shipment(&self, id: Uuid) -> Result<ShipmentView, DomainError> {
        let shipment = self.get_shipment(id)?;
        let Some(next) = shipment.status.next() else {
            return Err(DomainError::Conflict(format!(
                "Shipment {} is already {}",
                shipment.uti, shipment.status
            )));
        };
        self.shipments.set_status(id, shipment.status, next)
    }

    pub fn record_scan(&self, scan: NewScan) -> Result<TrackView, DomainError> {
        scan.validate()?;
        let track = self.tracks.record(scan)?;
        log::info!("{} scanned {}", track.worker_email, track.order_ref);
        Ok(track)
    }

    pub fn list_tracks(&self, order_ref: Option<&str>) -> Result<Vec<TrackView>, DomainError> {
        let order_ref = order_ref.map(str::trim).filter(|r| !r.is_empty());
        self.tracks.list(order_ref)
    }
}
