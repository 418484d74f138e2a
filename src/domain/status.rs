//! Status vocabularies shared by orders, deliveries, shipments and the POS.
//!
//! `OrderStatus` is the single canonical order lifecycle. The workflow is a
//! linear walk over [`ORDER_WORKFLOW`]; `Cancelled` sits outside of it and is
//! absorbing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "Pending", alias = "pending")]
    Pending,
    #[serde(rename = "Processing", alias = "processing")]
    Processing,
    #[serde(rename = "Quality Check", alias = "quality_check")]
    QualityCheck,
    #[serde(rename = "Ready for Delivery", alias = "ready_for_delivery")]
    ReadyForDelivery,
    #[serde(rename = "Out for Delivery", alias = "out_for_delivery")]
    OutForDelivery,
    #[serde(rename = "Completed", alias = "completed")]
    Completed,
    #[serde(rename = "Cancelled", alias = "cancelled")]
    Cancelled,
}

/// Forward order of the order lifecycle. `Cancelled` is deliberately absent.
pub const ORDER_WORKFLOW: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::QualityCheck,
    OrderStatus::ReadyForDelivery,
    OrderStatus::OutForDelivery,
    OrderStatus::Completed,
];

/// A requested move through the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance,
    Revert,
    Cancel,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::QualityCheck,
        OrderStatus::ReadyForDelivery,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Display label, also used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::QualityCheck => "Quality Check",
            OrderStatus::ReadyForDelivery => "Ready for Delivery",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Storage form (the `orders.status` column).
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::QualityCheck => "quality_check",
            OrderStatus::ReadyForDelivery => "ready_for_delivery",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn workflow_index(self) -> Option<usize> {
        ORDER_WORKFLOW.iter().position(|&s| s == self)
    }

    pub fn next(self) -> Option<OrderStatus> {
        let index = self.workflow_index()?;
        ORDER_WORKFLOW.get(index + 1).copied()
    }

    pub fn previous(self) -> Option<OrderStatus> {
        let index = self.workflow_index()?;
        index.checked_sub(1).map(|i| ORDER_WORKFLOW[i])
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether an explicit status change from `self` to `target` is allowed:
    /// one step forward or backward, or cancellation of an open order.
    pub fn can_move_to(self, target: OrderStatus) -> bool {
        if target == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(target) || self.previous() == Some(target)
    }

    pub fn apply(self, transition: Transition) -> Result<OrderStatus, DomainError> {
        match transition {
            Transition::Advance => self.next().ok_or_else(|| {
                DomainError::Conflict(format!("Order status {} has no next status", self))
            }),
            Transition::Revert => self.previous().ok_or_else(|| {
                DomainError::Conflict(format!("Order status {} has no previous status", self))
            }),
            Transition::Cancel if self.is_terminal() => Err(DomainError::Conflict(format!(
                "Order status {} cannot be cancelled",
                self
            ))),
            Transition::Cancel => Ok(OrderStatus::Cancelled),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Accepts both the display labels ("Quality Check") and the storage
    /// form ("quality_check"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown order status '{}'", s)))
    }
}

/// Status that follows `status` in the workflow. Unknown input, `Cancelled`
/// and `Completed` yield `None`.
pub fn next_status(status: &str) -> Option<OrderStatus> {
    status.parse::<OrderStatus>().ok()?.next()
}

/// Status that precedes `status` in the workflow. Unknown input, `Cancelled`
/// and `Pending` yield `None`.
pub fn previous_status(status: &str) -> Option<OrderStatus> {
    status.parse::<OrderStatus>().ok()?.previous()
}

/// Declares a closed string vocabulary whose wire and storage forms are the
/// same literal.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| DomainError::InvalidInput(format!("Unknown {} '{}'", $what, s)))
            }
        }
    };
}

string_enum!(PaymentStatus, "payment status" {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
});

string_enum!(Priority, "priority" {
    Normal => "Normal",
    High => "High",
    Urgent => "Urgent",
});

string_enum!(ServiceStatus, "service status" {
    Active => "Active",
    Inactive => "Inactive",
});

string_enum!(PaymentMethod, "payment method" {
    Cash => "cash",
    Credit => "credit",
    Debit => "debit",
    Mobile => "mobile",
});

string_enum!(DeliveryStatus, "delivery status" {
    Pending => "pending",
    InTransit => "in_transit",
    Delivered => "delivered",
    Failed => "failed",
});

string_enum!(ShipmentStatus, "shipment status" {
    Created => "created",
    InTransit => "in_transit",
    Delivered => "delivered",
});

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Active
    }
}

impl DeliveryStatus {
    pub fn is_final(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }

    /// Deliveries move forward only; failure is possible until delivered.
    pub fn can_move_to(self, target: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, target),
            (Pending, InTransit) | (InTransit, Delivered) | (Pending, Failed) | (InTransit, Failed)
        ) || self == target
    }
}

impl ShipmentStatus {
    pub fn next(self) -> Option<ShipmentStatus> {
        match self {
            ShipmentStatus::Created => Some(ShipmentStatus::InTransit),
            ShipmentStatus::InTransit => Some(ShipmentStatus::Delivered),
            ShipmentStatus::Delivered => None,
        }
    }
}
