use crate::framework::Record;
use crate::model::{PaginationMetadata, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderItemId(pub u64);

impl From<u64> for OrderItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_item_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that names none of the [`OrderStatus`] members.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownStatus(raw.to_string())),
        }
    }
}

/// Row of the `orders` relation. Line items live in their own relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for OrderRecord {
    type Id = OrderId;
    const TABLE: &'static str = "orders";

    fn id(&self) -> OrderId {
        self.id
    }
}

/// One product-quantity-price entry of an order. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
}

impl Record for OrderItem {
    type Id = OrderItemId;
    const TABLE: &'static str = "order_items";

    fn id(&self) -> OrderItemId {
        self.id
    }
}

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn assemble(record: OrderRecord, items: Vec<OrderItem>) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            total_price: record.total_price,
            status: record.status,
            items,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// The `orders` row for this order.
    pub fn record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            user_id: self.user_id,
            total_price: self.total_price,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Smallest product id referenced by the order.
    pub fn lead_product_id(&self) -> Option<ProductId> {
        self.items.iter().map(|item| item.product_id).min()
    }
}

/// A line of a new order, priced but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// A fully priced order waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn total_price(&self) -> i64 {
        self.items.iter().map(|item| item.subtotal).sum()
    }
}

/// A requested line: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLine>,
}

impl CreateOrderRequest {
    pub fn new(items: Vec<OrderLine>) -> Self {
        Self { items }
    }
}

/// Status change request. The status arrives as free text and is parsed by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
}

impl UpdateOrderRequest {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
        }
    }
}

/// One page of orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub data: Vec<Order>,
    pub pagination: PaginationMetadata,
}
