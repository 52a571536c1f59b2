//! # Stock Ledger
//!
//! The only code path that changes a product's stock counter for an order. Every
//! adjustment is a read-check-write on the product row inside a unit of work, so
//! the non-negative check always sees the value the write will replace.
//!
//! Three ways to use it:
//!
//! - [`StockLedger::adjust_stock`] opens its own transaction.
//! - [`StockLedger::adjust_within`] joins a transaction the caller already holds.
//! - [`StockLedger::mutation`] packages an adjustment for the order repository to
//!   apply inside its transaction.

use crate::framework::RequestContext;
use crate::model::{Product, ProductId};
use crate::product::ProductError;
use crate::store::{Store, UnitOfWork};
use tracing::{debug, instrument};

/// A deferred stock adjustment, applied inside someone else's transaction.
pub type StockMutation = Box<dyn FnOnce(&mut UnitOfWork<'_>) -> Result<(), ProductError> + Send>;

#[derive(Clone)]
pub struct StockLedger {
    store: Store,
}

impl StockLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Adjusts stock by `delta` in a transaction of its own.
    #[instrument(skip(self, ctx))]
    pub async fn adjust_stock(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Product, ProductError> {
        self.store
            .transact(ctx, "adjust_stock", move |uow| {
                Self::adjust_within(uow, product_id, delta)
            })
            .await
    }

    /// Adjusts stock by `delta` as part of the caller's unit of work.
    ///
    /// Fails with `InsufficientStock` when the result would be negative; nothing is
    /// staged in that case.
    pub fn adjust_within(
        uow: &mut UnitOfWork<'_>,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Product, ProductError> {
        let mut product = uow
            .products()
            .get(product_id)
            .ok_or(ProductError::NotFound(product_id))?;

        let new_stock = product
            .stock
            .checked_add(delta)
            .ok_or_else(|| ProductError::Validation(format!("stock of {product_id} overflows")))?;
        if new_stock < 0 {
            return Err(ProductError::InsufficientStock {
                product_id,
                requested: delta.saturating_neg(),
                available: product.stock,
            });
        }

        debug!(%product_id, from = product.stock, to = new_stock, "Stock staged");
        product.stock = new_stock;
        product.updated_at = uow.now();
        uow.products().put(product.clone());
        Ok(product)
    }

    /// Packages an adjustment of `delta` for later application.
    pub fn mutation(product_id: ProductId, delta: i64) -> StockMutation {
        Box::new(move |uow: &mut UnitOfWork<'_>| {
            Self::adjust_within(uow, product_id, delta).map(|_| ())
        })
    }
}
