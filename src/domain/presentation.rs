//! Badge classes for status values shown by the dashboards.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::Priority;

pub const DEFAULT_BADGE: &str = "bg-gray-100 text-gray-800";

/// Maps any status literal (order workflow labels, order storage values,
/// delivery, shipment and payment statuses) to a badge class. Unknown values
/// fall into the gray bucket.
pub fn status_badge_class(status: &str) -> &'static str {
    let normalized: String = status
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();

    match normalized.as_str() {
        "pending" => "bg-yellow-100 text-yellow-800",
        "processing" | "in_transit" => "bg-blue-100 text-blue-800",
        "quality_check" => "bg-purple-100 text-purple-800",
        "ready_for_delivery" => "bg-orange-100 text-orange-800",
        "out_for_delivery" => "bg-indigo-100 text-indigo-800",
        "completed" | "delivered" | "paid" => "bg-green-100 text-green-800",
        "cancelled" | "failed" => "bg-red-100 text-red-800",
        "created" => "bg-sky-100 text-sky-800",
        _ => DEFAULT_BADGE,
    }
}

pub fn priority_badge_class(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => "bg-red-100 text-red-800",
        Priority::High => "bg-orange-100 text-orange-800",
        Priority::Normal => "bg-green-100 text-green-800",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StockLevel {
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    Low,
    #[serde(rename = "In Stock")]
    InStock,
}

impl StockLevel {
    pub fn classify(quantity: i32, reorder_level: i32) -> StockLevel {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if quantity <= reorder_level {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "Out of Stock",
            StockLevel::Low => "Low Stock",
            StockLevel::InStock => "In Stock",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "status-error",
            StockLevel::Low => "status-warning",
            StockLevel::InStock => "status-online",
        }
    }
}
