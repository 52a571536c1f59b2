//! Order status state machine.
//!
//! | From \ To  | PENDING   | PAID      | CANCELLED        |
//! |------------|-----------|-----------|------------------|
//! | PENDING    | no-op     | allowed   | allowed, restock |
//! | PAID       | forbidden | no-op     | allowed, restock |
//! | CANCELLED  | forbidden | forbidden | no-op            |

use crate::model::OrderStatus;
use crate::order::OrderError;

/// What a permitted transition does to stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    Restore,
}

pub fn plan_transition(from: OrderStatus, to: OrderStatus) -> Result<StockEffect, OrderError> {
    use OrderStatus::*;
    match (from, to) {
        (Cancelled, Cancelled) => Ok(StockEffect::None),
        (Cancelled, _) => Err(OrderError::CannotChangeCancelledOrderStatus),
        (Paid, Pending) => Err(OrderError::CannotChangePaidOrderToPending),
        (_, Cancelled) => Ok(StockEffect::Restore),
        _ => Ok(StockEffect::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn full_transition_table() {
        let table = [
            (Pending, Pending, Ok(StockEffect::None)),
            (Pending, Paid, Ok(StockEffect::None)),
            (Pending, Cancelled, Ok(StockEffect::Restore)),
            (Paid, Pending, Err(OrderError::CannotChangePaidOrderToPending)),
            (Paid, Paid, Ok(StockEffect::None)),
            (Paid, Cancelled, Ok(StockEffect::Restore)),
            (Cancelled, Pending, Err(OrderError::CannotChangeCancelledOrderStatus)),
            (Cancelled, Paid, Err(OrderError::CannotChangeCancelledOrderStatus)),
            (Cancelled, Cancelled, Ok(StockEffect::None)),
        ];
        for (from, to, expected) in table {
            assert_eq!(plan_transition(from, to), expected, "{from} -> {to}");
        }
    }
}
