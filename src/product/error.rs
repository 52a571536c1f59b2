use crate::framework::FrameworkError;
use crate::model::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("Invalid product: {0}")]
    Validation(String),

    #[error("Product {0} is referenced by existing orders")]
    InUse(ProductId),

    #[error("Store error: {0}")]
    Store(#[from] FrameworkError),
}
