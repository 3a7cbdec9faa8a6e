//! Integration tests for Tiffin.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tiffin-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_checkout` - Cart math, vendor scoping, checkout gating
//! - `order_lifecycle` - Status updates and the documented transition gap
//! - `offline_queue` - Write-only queue semantics and persistence
//! - `tracking_stream` - Mock tracking subscription lifecycle
//!
//! Everything runs against in-memory or tempdir-backed storage; no server
//! or network is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use tiffin_client::models::{CartItem, Vendor};
use tiffin_core::{CartLineId, CurrencyCode, Price, ProductId, VendorId};

/// Build a test vendor with a $10.00 minimum and $2.99 delivery fee.
#[must_use]
pub fn test_vendor(id: i64) -> Vendor {
    Vendor {
        id: VendorId::new(id),
        name: format!("Test Vendor {id}"),
        is_open: true,
        minimum_order: Price::from_cents(1000, CurrencyCode::USD),
        delivery_fee: Price::from_cents(299, CurrencyCode::USD),
    }
}

/// Build an available test cart line.
#[must_use]
pub fn test_item(line: i64, product: i64, cents: i64, quantity: u32) -> CartItem {
    CartItem {
        id: CartLineId::new(line),
        product_id: ProductId::new(product),
        name: format!("Test Item {product}"),
        price: Price::from_cents(cents, CurrencyCode::USD),
        quantity,
        is_available: true,
    }
}
