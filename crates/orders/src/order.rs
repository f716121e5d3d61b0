use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use geodepot_catalog::Product;
use geodepot_core::{DomainError, DomainResult, OrderId, OrderItemId};

/// Order status lifecycle.
///
/// `Draft` orders live in the client cart; `confirm` moves them to
/// `Pending`. The remaining states are driven by the back office and the
/// extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    QuoteDone,
    Ready,
    Processed,
    Rejected,
}

/// One line of an order: exactly one product, optionally with the data
/// format chosen for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    product: Product,
    data_format: Option<String>,
}

impl OrderItem {
    pub fn new(product: Product) -> Self {
        Self {
            id: OrderItemId::new(),
            product,
            data_format: None,
        }
    }

    pub fn with_data_format(mut self, format: impl Into<String>) -> Self {
        self.data_format = Some(format.into());
        self
    }

    pub fn id(&self) -> OrderItemId {
        self.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn data_format(&self) -> Option<&str> {
        self.data_format.as_deref()
    }
}

/// A client-side order aggregate.
///
/// Mutation is copy-on-write: every mutating operation returns a fresh
/// `Order` value and leaves `self` untouched, so holders of the previous
/// value never observe partial updates and object identity changes exactly
/// when the order really changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    title: String,
    status: OrderStatus,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new empty draft order.
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(),
            title: title.into(),
            status: OrderStatus::Draft,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Items may be added or removed only while the order is still on the
    /// client's side of the workflow.
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, OrderStatus::Draft | OrderStatus::Pending)
    }

    /// Append `item`. Duplicates are kept as-is: adding the same product
    /// twice yields two items.
    pub fn with_item(&self, item: OrderItem) -> Order {
        let mut next = self.clone();
        next.items.push(item);
        next
    }

    /// Remove the item at `index`.
    pub fn without_item(&self, index: usize) -> DomainResult<Order> {
        if !self.is_modifiable() {
            return Err(DomainError::conflict(
                "items cannot be removed in the current order status",
            ));
        }
        if index >= self.items.len() {
            return Err(DomainError::not_found());
        }
        let mut next = self.clone();
        next.items.remove(index);
        Ok(next)
    }

    /// Confirm the order, handing it over to the back office.
    ///
    /// Allowed from `Draft` and `QuoteDone`. The order must have at least
    /// one item and every item must carry a data format.
    pub fn confirm(&self) -> DomainResult<Order> {
        if !matches!(self.status, OrderStatus::Draft | OrderStatus::QuoteDone) {
            return Err(DomainError::conflict(
                "order status is not draft or quote_done",
            ));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("this order has no item"));
        }
        if self.items.iter().any(|i| i.data_format.is_none()) {
            return Err(DomainError::validation(
                "one or more items don't have a data format",
            ));
        }
        let mut next = self.clone();
        next.status = OrderStatus::Pending;
        Ok(next)
    }
}
