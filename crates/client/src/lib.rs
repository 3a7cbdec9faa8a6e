//! Tiffin Client - Client-side state core for the Tiffin delivery app.
//!
//! This crate holds everything the mobile UI binds to:
//!
//! - [`stores`] - Cart and orders state containers with snapshot subscriptions
//! - [`storage`] - Offline key-value persistence and the pending-action queue
//! - [`tracking`] - Mock live order tracking (timer-driven simulation)
//! - [`api`] - Thin REST client for the Tiffin backend
//! - [`state`] - `AppState` aggregating the above behind one cheap-to-clone handle
//!
//! # Architecture
//!
//! UI screens mutate a store; the store recomputes derived fields
//! synchronously and publishes a fresh snapshot on a watch channel; the UI
//! re-renders from the snapshot. Stores are total over local state and never
//! return errors. Storage and API calls do fail, and surface `AppError`.
//!
//! There is no server in this crate, no real socket, and no offline replay
//! protocol - the tracking service is an explicit simulation and the offline
//! queue is recorded but never drained. Both gaps are documented where they
//! live.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod stores;
pub mod telemetry;
pub mod tracking;

pub use config::ClientConfig;
pub use error::{AppError, Result};
pub use state::AppState;
