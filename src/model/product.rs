use crate::framework::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// A catalog entry with its stock counter.
///
/// `price` is in the smallest currency unit. `stock` never goes below zero; it is
/// only changed through [`StockLedger`](crate::product::StockLedger) or an
/// explicit product update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Product {
    type Id = ProductId;
    const TABLE: &'static str = "products";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// DTO for Product creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: i64, stock: i64) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }
}

/// DTO for Product updates. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
}

/// One page of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub pagination: crate::model::PaginationMetadata,
}
