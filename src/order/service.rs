//! # Order Service
//!
//! Validates order requests, prices them against the catalog, and hands the
//! repository a plan it can commit atomically: the order rows plus one stock
//! mutation per distinct product.
//!
//! ## Create flow
//!
//! ```text
//! request ──validate──▶ catalog lookups ──price lines──▶ coalesce per product
//!                                                              │
//!                                   pre-check stock ◀──────────┘
//!                                          │
//!              repository.create_with_transaction(order, [debit per product])
//!                                          │
//!                    stock re-checked and written in the same transaction
//! ```
//!
//! The pre-check only rejects early. The authoritative check is the ledger's
//! read-check-write inside the transaction, which is what prevents overselling
//! when requests race.

use crate::framework::RequestContext;
use crate::model::{
    CreateOrderRequest, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderListResponse,
    OrderSortField, OrderStatus, PaginationQuery, Product, ProductId, UpdateOrderRequest, UserId,
};
use crate::order::transition::{plan_transition, StockEffect};
use crate::order::{OrderError, OrderRepository};
use crate::product::{ProductCatalog, ProductService, StockLedger, StockMutation};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct OrderService<C = ProductService> {
    repository: OrderRepository,
    catalog: C,
}

impl<C: ProductCatalog> OrderService<C> {
    pub fn new(repository: OrderRepository, catalog: C) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Creates a `PENDING` order and reserves its stock in one transaction.
    #[instrument(skip(self, ctx, request), fields(lines = request.items.len()))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        request: CreateOrderRequest,
        user_id: UserId,
    ) -> Result<Order, OrderError> {
        if user_id.is_missing() {
            return Err(OrderError::MissingUserId);
        }
        if request.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        for line in &request.items {
            if line.quantity <= 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }
        }
        ctx.check()?;

        let mut products: BTreeMap<ProductId, Product> = BTreeMap::new();
        let mut items = Vec::with_capacity(request.items.len());
        let mut total_price: i64 = 0;
        for line in &request.items {
            if !products.contains_key(&line.product_id) {
                let product = self
                    .catalog
                    .get_product_by_id(ctx, line.product_id)
                    .await
                    .map_err(OrderError::from)?;
                products.insert(line.product_id, product);
            }
            let unit_price = products[&line.product_id].price;
            let subtotal = line
                .quantity
                .checked_mul(unit_price)
                .ok_or(OrderError::AmountOverflow(line.product_id))?;
            total_price = total_price
                .checked_add(subtotal)
                .ok_or(OrderError::AmountOverflow(line.product_id))?;
            items.push(NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price,
                subtotal,
            });
        }

        let new_order = NewOrder { user_id, items };
        debug_assert_eq!(new_order.total_price(), total_price);

        let reservations = coalesce(new_order.items.iter().map(|item| (item.product_id, item.quantity)))?;
        for (product_id, quantity) in &reservations {
            let available = products[product_id].stock;
            if *quantity > available {
                warn!(%product_id, requested = *quantity, available, "Insufficient stock");
                return Err(OrderError::InsufficientStock {
                    product_id: *product_id,
                    requested: *quantity,
                    available,
                });
            }
        }

        let debits: Vec<StockMutation> = reservations
            .into_iter()
            .map(|(product_id, quantity)| StockLedger::mutation(product_id, -quantity))
            .collect();
        let order = self
            .repository
            .create_with_transaction(ctx, new_order, debits)
            .await?;
        info!(order_id = %order.id, total_price = order.total_price, "Order created");
        Ok(order)
    }

    pub async fn get_order_by_id(&self, ctx: &RequestContext, id: OrderId) -> Result<Order, OrderError> {
        self.repository
            .find_by_id(ctx, id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    pub async fn get_all_orders_with_query(
        &self,
        ctx: &RequestContext,
        query: &PaginationQuery,
    ) -> Result<OrderListResponse, OrderError> {
        let field: OrderSortField = query.sort_field();
        let (data, total) = self
            .repository
            .find_all_with_pagination(ctx, query.offset(), query.limit(), field, query.direction())
            .await?;
        Ok(OrderListResponse {
            data,
            pagination: query.metadata(total),
        })
    }

    /// Applies a status change requested by the order's owner.
    ///
    /// Cancelling returns every line's quantity to stock in the same transaction
    /// as the status write. Ownership and the transition are checked again
    /// against the stored row inside that transaction.
    #[instrument(skip(self, ctx, request))]
    pub async fn update_order(
        &self,
        ctx: &RequestContext,
        id: OrderId,
        request: UpdateOrderRequest,
        user_id: UserId,
    ) -> Result<Order, OrderError> {
        let current = self.get_order_by_id(ctx, id).await?;
        if current.user_id != user_id {
            warn!("Update rejected: not the owner");
            return Err(OrderError::NotAuthorizedToUpdate(id));
        }
        let Some(raw_status) = request.status else {
            return Ok(current);
        };
        let target: OrderStatus = raw_status.parse()?;
        plan_transition(current.status, target)?;
        if current.status == target {
            return Ok(current);
        }

        let from = current.status;
        let order = self
            .repository
            .update_with_transaction(ctx, id, move |order| {
                if order.user_id != user_id {
                    return Err(OrderError::NotAuthorizedToUpdate(order.id));
                }
                let mutations = match plan_transition(order.status, target)? {
                    StockEffect::Restore => restock(&order.items)?,
                    StockEffect::None => Vec::new(),
                };
                order.status = target;
                Ok(mutations)
            })
            .await?;
        info!(%from, to = %order.status, "Order status changed");
        Ok(order)
    }

    /// Deletes an order, returning its stock unless it was already cancelled.
    #[instrument(skip(self, ctx))]
    pub async fn delete_order(&self, ctx: &RequestContext, id: OrderId) -> Result<(), OrderError> {
        self.get_order_by_id(ctx, id).await?;
        let deleted = self
            .repository
            .delete_with_transaction(ctx, id, |order| match order.status {
                OrderStatus::Cancelled => Ok(Vec::new()),
                OrderStatus::Pending | OrderStatus::Paid => restock(&order.items),
            })
            .await?;
        info!(status = %deleted.status, items = deleted.items.len(), "Order deleted");
        Ok(())
    }
}

/// Sums quantities per product, in product id order.
fn coalesce(lines: impl Iterator<Item = (ProductId, i64)>) -> Result<BTreeMap<ProductId, i64>, OrderError> {
    let mut totals: BTreeMap<ProductId, i64> = BTreeMap::new();
    for (product_id, quantity) in lines {
        let total = totals.entry(product_id).or_insert(0);
        *total = total
            .checked_add(quantity)
            .ok_or(OrderError::AmountOverflow(product_id))?;
    }
    Ok(totals)
}

/// One credit per distinct product covering every line of `items`.
fn restock(items: &[OrderItem]) -> Result<Vec<StockMutation>, OrderError> {
    Ok(coalesce(items.iter().map(|item| (item.product_id, item.quantity)))?
        .into_iter()
        .map(|(product_id, quantity)| StockLedger::mutation(product_id, quantity))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesce_merges_duplicate_products() {
        let merged = coalesce(
            [(ProductId(2), 1), (ProductId(1), 4), (ProductId(2), 3)].into_iter(),
        )
        .unwrap();
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec![(ProductId(1), 4), (ProductId(2), 4)]);
    }

    #[test]
    fn coalesce_rejects_overflow() {
        let err = coalesce([(ProductId(1), i64::MAX), (ProductId(1), 1)].into_iter()).unwrap_err();
        assert_eq!(err, OrderError::AmountOverflow(ProductId(1)));
    }
}
