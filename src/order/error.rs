use crate::framework::FrameworkError;
use crate::model::{OrderId, ProductId, UnknownStatus};
use crate::product::ProductError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("User id is required")]
    MissingUserId,

    #[error("Order must contain at least one item")]
    EmptyItems,

    #[error("Invalid quantity {quantity} for {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    #[error("Order amount overflows for {0}")]
    AmountOverflow(ProductId),

    #[error("Invalid status value: {0:?}")]
    InvalidStatusValue(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("Cannot change a paid order back to pending")]
    CannotChangePaidOrderToPending,

    #[error("Cannot change the status of a cancelled order")]
    CannotChangeCancelledOrderStatus,

    #[error("Not authorized to update {0}")]
    NotAuthorizedToUpdate(OrderId),

    #[error("Store error: {0}")]
    Store(#[from] FrameworkError),
}

/// Coarse classification used at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    BusinessRule,
    Infrastructure,
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OrderNotFound(_) | Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::MissingUserId
            | Self::EmptyItems
            | Self::InvalidQuantity { .. }
            | Self::AmountOverflow(_)
            | Self::InvalidStatusValue(_)
            | Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::InsufficientStock { .. }
            | Self::CannotChangePaidOrderToPending
            | Self::CannotChangeCancelledOrderStatus
            | Self::NotAuthorizedToUpdate(_) => ErrorKind::BusinessRule,
            Self::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotAuthorizedToUpdate(_) => 403,
            Self::InsufficientStock { .. } => 409,
            _ => match self.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::Validation | ErrorKind::BusinessRule => 400,
                ErrorKind::Infrastructure => 500,
            },
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) | Self::ProductNotFound(_) => "DATA_NOT_FOUND",
            Self::NotAuthorizedToUpdate(_) => "FORBIDDEN",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::CannotChangePaidOrderToPending | Self::CannotChangeCancelledOrderStatus => {
                "INVALID_STATUS_TRANSITION"
            }
            Self::Store(_) => "DATABASE_ERROR",
            _ => "VALIDATION_ERROR",
        }
    }
}

impl From<UnknownStatus> for OrderError {
    fn from(e: UnknownStatus) -> Self {
        Self::InvalidStatusValue(e.0)
    }
}

impl From<ProductError> for OrderError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => Self::ProductNotFound(id),
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::Validation(message) => Self::InvalidRequest(message),
            ProductError::InUse(id) => Self::InvalidRequest(format!("{id} is in use")),
            ProductError::Store(e) => Self::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_and_status_codes() {
        let cases = [
            (OrderError::OrderNotFound(OrderId(1)), ErrorKind::NotFound, 404),
            (OrderError::ProductNotFound(ProductId(1)), ErrorKind::NotFound, 404),
            (OrderError::EmptyItems, ErrorKind::Validation, 400),
            (OrderError::InvalidStatusValue("x".into()), ErrorKind::Validation, 400),
            (OrderError::CannotChangePaidOrderToPending, ErrorKind::BusinessRule, 400),
            (OrderError::NotAuthorizedToUpdate(OrderId(1)), ErrorKind::BusinessRule, 403),
            (
                OrderError::InsufficientStock { product_id: ProductId(1), requested: 2, available: 1 },
                ErrorKind::BusinessRule,
                409,
            ),
            (OrderError::Store(FrameworkError::ActorClosed), ErrorKind::Infrastructure, 500),
        ];
        for (error, kind, status) in cases {
            assert_eq!(error.kind(), kind, "{error}");
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn product_errors_map_to_order_errors() {
        assert_eq!(
            OrderError::from(ProductError::NotFound(ProductId(7))),
            OrderError::ProductNotFound(ProductId(7))
        );
        assert_eq!(
            OrderError::from(ProductError::Store(FrameworkError::Cancelled)),
            OrderError::Store(FrameworkError::Cancelled)
        );
        assert_eq!(OrderError::from(ProductError::Store(FrameworkError::Cancelled)).code(), "DATABASE_ERROR");
    }

    #[test]
    fn unknown_status_is_an_invalid_status_value() {
        let err = OrderError::from(UnknownStatus("SHIPPED".into()));
        assert_eq!(err, OrderError::InvalidStatusValue("SHIPPED".into()));
        assert_eq!(err.status_code(), 400);
    }
}
