use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;
use super::status::{DeliveryStatus, ShipmentStatus};

#[derive(Debug, Clone)]
pub struct DeliveryView {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub driver_name: String,
    pub vehicle_id: String,
    pub status: DeliveryStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub location: Option<Value>,
    pub route: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub order_id: Option<Uuid>,
    pub driver_name: String,
    pub vehicle_id: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub route: Option<Value>,
}

impl NewDelivery {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.driver_name.trim().is_empty() || self.vehicle_id.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryChanges {
    pub driver_name: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub location: Option<Value>,
    pub route: Option<Value>,
}

/// Checks a delivery status change and stamps `actual_delivery` the moment
/// a delivery is marked delivered.
pub fn plan_delivery_update(
    current: &DeliveryView,
    mut changes: DeliveryChanges,
    now: DateTime<Utc>,
) -> Result<DeliveryChanges, DomainError> {
    if let Some(target) = changes.status {
        if !current.status.can_move_to(target) {
            return Err(DomainError::Conflict(format!(
                "Delivery cannot move from {} to {}",
                current.status, target
            )));
        }
        if target == DeliveryStatus::Delivered && current.actual_delivery.is_none() {
            changes.actual_delivery = Some(now);
        }
    }
    if let Some(location) = &changes.location {
        validate_location(location)?;
    }
    Ok(changes)
}

/// A location must be a `{ "lat": number, "lng": number }` object.
pub fn validate_location(location: &Value) -> Result<(), DomainError> {
    let coordinate = |key: &str| location.get(key).and_then(Value::as_f64);
    match (coordinate("lat"), coordinate("lng")) {
        (Some(lat), Some(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
            Ok(())
        }
        _ => Err(DomainError::invalid("location must contain valid lat and lng")),
    }
}

#[derive(Debug, Clone)]
pub struct ShipmentView {
    pub id: Uuid,
    pub uti: String,
    pub store_id: String,
    pub staff_name: String,
    pub status: ShipmentStatus,
    pub order_ids: Vec<Uuid>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShipmentView {
    pub fn package_count(&self) -> usize {
        self.order_ids.len()
    }
}

#[derive(Debug, Clone)]
pub struct NewShipment {
    pub store_id: String,
    pub staff_name: String,
    pub order_ids: Vec<Uuid>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl NewShipment {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.store_id.trim().is_empty() || self.staff_name.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }
        if self.order_ids.is_empty() {
            return Err(DomainError::invalid(
                "Please select at least one order to create a shipment",
            ));
        }
        Ok(())
    }

    /// Order ids with duplicates removed, first occurrence wins.
    pub fn distinct_order_ids(&self) -> Vec<Uuid> {
        let mut seen = Vec::with_capacity(self.order_ids.len());
        for id in &self.order_ids {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}

/// Unified Tracking ID grouping several orders into one transport batch.
pub fn format_uti(year: i32, sequence: i64) -> String {
    format!("UTI-{}-{:03}", year, sequence)
}

#[derive(Debug, Clone)]
pub struct TrackView {
    pub id: Uuid,
    pub worker_name: String,
    pub worker_email: String,
    pub order_ref: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
    pub order_data: String,
    pub scanned_at: DateTime<Utc>,
}

/// A worker's QR scan of an order label.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub worker_name: String,
    pub worker_email: String,
    pub order_data: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
}

impl NewScan {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [&self.worker_name, &self.worker_email, &self.order_data];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(DomainError::invalid("Missing required fields"));
        }
        Ok(())
    }

    /// Order reference carried by the scanned text: the `orderId` (or
    /// `orderNumber`) of a JSON label, otherwise the raw text itself.
    pub fn order_ref(&self) -> String {
        let raw = self.order_data.trim();
        if let Ok(Value::Object(label)) = serde_json::from_str::<Value>(raw) {
            for key in ["orderId", "orderNumber"] {
                if let Some(value) = label.get(key).and_then(Value::as_str) {
                    return value.to_string();
                }
            }
        }
        raw.to_string()
    }
}
