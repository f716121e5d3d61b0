//! `geodepot-orders` — order aggregate and status lifecycle.

pub mod order;

pub use order::{Order, OrderItem, OrderStatus};
