//! Domain models shared by the stores, storage, and API layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiffin_core::{
    CartLineId, Email, OrderId, OrderStatus, Price, ProductId, TaskerId, UserId, UserRole, VendorId,
};

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    /// Always positive; a quantity update to zero removes the line instead.
    pub quantity: u32,
    /// Vendor-reported availability at the time the item was fetched.
    pub is_available: bool,
}

impl CartItem {
    /// Line total: `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Seller/restaurant entity scoping a cart.
///
/// At most one vendor is attached to the cart at a time; adding an item from
/// a different vendor replaces the cart wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub is_open: bool,
    pub minimum_order: Price,
    pub delivery_fee: Price,
}

/// Derived money fields, recomputed on every cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

/// A placed order, retained indefinitely in the local persisted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub vendor_id: VendorId,
    pub items: Vec<CartItem>,
    pub status: OrderStatus,
    pub tasker_id: Option<TaskerId>,
    pub totals: OrderTotals,
    pub eta_minutes: Option<u32>,
    pub placed_at: DateTime<Utc>,
}

/// Non-status fields that [`update_order`](crate::stores::OrdersStore::update_order)
/// may merge into an existing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub tasker_id: Option<TaskerId>,
    pub eta_minutes: Option<u32>,
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One fabricated tracking tick for a subscribed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub position: GeoPoint,
    pub eta_minutes: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Signed-in user profile as returned by `/api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
}
