//! Integration tests for the mock tracking stream and its wiring into the
//! orders store.

use std::time::Duration;

use chrono::Utc;
use tiffin_client::models::{Order, OrderTotals};
use tiffin_client::storage::OfflineStore;
use tiffin_client::stores::OrdersStore;
use tiffin_client::tracking::{MockTrackingService, TrackingConfig};
use tiffin_core::{CurrencyCode, OrderId, OrderStatus, Price, VendorId};

fn fast_service() -> MockTrackingService {
    MockTrackingService::new(TrackingConfig {
        tick: Duration::from_millis(5),
        ticks_per_stage: 1,
        ..TrackingConfig::default()
    })
}

fn placed_order() -> Order {
    let zero = Price::zero(CurrencyCode::USD);
    Order {
        id: OrderId::generate(),
        vendor_id: VendorId::new(1),
        items: vec![],
        status: OrderStatus::TaskerAssigned,
        tasker_id: None,
        totals: OrderTotals {
            subtotal: zero,
            delivery_fee: zero,
            total: zero,
        },
        eta_minutes: None,
        placed_at: Utc::now(),
    }
}

// =============================================================================
// Stream Lifecycle
// =============================================================================

#[tokio::test]
async fn test_initial_update_within_one_tick() {
    let service = fast_service();
    let mut sub = service.subscribe(OrderId::generate(), OrderStatus::InTransit);

    let update = tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("no update within one tick")
        .expect("stream ended before first update");
    assert_eq!(update.status, OrderStatus::InTransit);
    assert!(update.eta_minutes <= 30);
}

#[tokio::test]
async fn test_no_updates_after_terminal_status() {
    let service = fast_service();
    let mut sub = service.subscribe(OrderId::generate(), OrderStatus::Arriving);

    let mut saw_delivered = false;
    while let Some(update) = sub.recv().await {
        assert!(
            !saw_delivered,
            "received an update after the terminal status"
        );
        if update.status == OrderStatus::Delivered {
            saw_delivered = true;
        }
    }
    assert!(saw_delivered);
}

#[tokio::test]
async fn test_positions_stay_near_route() {
    let config = TrackingConfig {
        tick: Duration::from_millis(5),
        ticks_per_stage: 1,
        ..TrackingConfig::default()
    };
    let (origin, destination) = (config.origin, config.destination);
    let service = MockTrackingService::new(config);
    let mut sub = service.subscribe(OrderId::generate(), OrderStatus::PickedUp);

    while let Some(update) = sub.recv().await {
        let lat_min = origin.lat.min(destination.lat) - 0.001;
        let lat_max = origin.lat.max(destination.lat) + 0.001;
        assert!(update.position.lat >= lat_min && update.position.lat <= lat_max);
    }
}

// =============================================================================
// Feeding the Orders Store
// =============================================================================

/// The tracking stream is what the order-status screen renders from; driving
/// the orders store from it is the whole point of the simulation.
#[tokio::test]
async fn test_tracking_updates_drive_orders_store() {
    let store = OrdersStore::with_persistence(OfflineStore::in_memory());
    let order = placed_order();
    store.add_order(order.clone());

    let service = fast_service();
    let mut sub = service.subscribe(order.id, order.status);

    while let Some(update) = sub.recv().await {
        store.update_order_status(update.order_id, update.status);
    }

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.get(order.id).map(|o| o.status),
        Some(OrderStatus::Delivered)
    );
    // Delivery cleared the active marker
    assert!(snapshot.active_order_id.is_none());
}

#[tokio::test]
async fn test_unsubscribe_stops_stream() {
    let service = MockTrackingService::new(TrackingConfig {
        tick: Duration::from_secs(30),
        ticks_per_stage: 1,
        ..TrackingConfig::default()
    });
    let sub = service.subscribe(OrderId::generate(), OrderStatus::InTransit);
    // Stopping must not hang or panic even with a long tick pending
    sub.stop();
}
