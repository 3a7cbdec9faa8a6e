//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order delivery status.
///
/// This is a closed 11-value enum covering the whole delivery lifecycle.
/// The stores assign statuses directly; there is no enforced transition
/// table, so any status may follow any other. See the orders store docs
/// for why that gap is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    TaskerAssigned,
    PickedUp,
    InTransit,
    Arriving,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether this status ends the order lifecycle.
    ///
    /// Tracking subscriptions stop once a terminal status is reached, and
    /// the orders store clears the active-order marker.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::TaskerAssigned => "tasker_assigned",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::Arriving => "arriving",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready_for_pickup" => Ok(Self::ReadyForPickup),
            "tasker_assigned" => Ok(Self::TaskerAssigned),
            "picked_up" => Ok(Self::PickedUp),
            "in_transit" => Ok(Self::InTransit),
            "arriving" => Ok(Self::Arriving),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Role a signed-in user acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Places orders.
    #[default]
    Customer,
    /// Gig-worker delivery agent fulfilling orders.
    Tasker,
    /// Seller/restaurant managing a storefront.
    Vendor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Tasker => write!(f, "tasker"),
            Self::Vendor => write!(f, "vendor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_round_trip() {
        let all = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
            OrderStatus::TaskerAssigned,
            OrderStatus::PickedUp,
            OrderStatus::InTransit,
            OrderStatus::Arriving,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ];
        assert_eq!(all.len(), 11);
        for status in all {
            let parsed = OrderStatus::from_str(&status.to_string()).expect("parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::InTransit.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_order_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReadyForPickup).expect("serialize");
        assert_eq!(json, "\"ready_for_pickup\"");
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(OrderStatus::from_str("teleported").is_err());
    }
}
