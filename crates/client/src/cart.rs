//! Client-side cart: a single-writer store holding the current order.

use tokio::sync::watch;

use geodepot_catalog::Product;
use geodepot_orders::{Order, OrderItem};

/// Holds the order being assembled, with a subscribe/notify interface.
///
/// All mutation goes through this store in program order. Updates are
/// copy-on-write: the stored `Order` value is replaced wholesale, never
/// patched in place, so a reader holding a previous snapshot keeps an
/// unchanged value and identity changes exactly when the order does.
pub struct CartStore {
    tx: watch::Sender<Order>,
}

impl CartStore {
    pub fn new(initial: Order) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current order snapshot.
    pub fn current(&self) -> Order {
        self.tx.borrow().clone()
    }

    /// Watch the current order; the receiver sees every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Order> {
        self.tx.subscribe()
    }

    /// Replace the held order wholesale.
    pub fn update_order(&self, order: Order) {
        self.tx.send_replace(order);
    }

    /// Append an item wrapping `product` to a copy of the current order
    /// and publish the copy. Other order fields are untouched.
    pub fn add_to_cart(&self, product: &Product) {
        let next = self.tx.borrow().with_item(OrderItem::new(product.clone()));
        self.tx.send_replace(next);
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Order::draft("cart"))
    }
}
