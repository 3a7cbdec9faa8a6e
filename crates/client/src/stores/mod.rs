//! Client-side state containers.
//!
//! Each store is a cheap-to-clone handle over shared state. Mutations are
//! synchronous and run to completion; derived fields are recomputed inside
//! the same call; a fresh snapshot is published on a watch channel for the
//! UI to render from. Store operations are total over local state and never
//! return errors.

mod cart;
mod orders;

pub use cart::{CartSnapshot, CartStore};
pub use orders::{OrdersSnapshot, OrdersStore};
