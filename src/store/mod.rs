//! # Order Store
//!
//! The three relations of the engine (`products`, `orders`, `order_items`) live
//! together in one [`Tables`] value owned by a single [`StoreActor`]. Keeping them
//! under one owner is what makes a cross-aggregate write, such as "decrement
//! stock on two products and insert an order", a single atomic step.
//!
//! Writers go through [`Store::transact`]: the closure receives a [`UnitOfWork`]
//! that stages every change; the changes are applied only if the closure returns
//! `Ok`. Readers go through [`Store::read`] and see committed state only.

use crate::framework::{
    FrameworkError, RequestContext, StoreActor, StoreClient, Table, TableTx, TableWrites,
    TxOutcome,
};
use crate::model::{OrderItem, OrderRecord, Product};
use chrono::{DateTime, Utc};

/// Every relation of the engine.
#[derive(Debug, Default)]
pub struct Tables {
    pub products: Table<Product>,
    pub orders: Table<OrderRecord>,
    pub order_items: Table<OrderItem>,
}

impl Tables {
    fn apply(&mut self, changes: Changes) {
        self.products.apply(changes.products);
        self.orders.apply(changes.orders);
        self.order_items.apply(changes.order_items);
    }
}

/// Staged writes of one transaction across every relation.
pub struct UnitOfWork<'a> {
    products: TableTx<'a, Product>,
    orders: TableTx<'a, OrderRecord>,
    order_items: TableTx<'a, OrderItem>,
    now: DateTime<Utc>,
}

impl<'a> UnitOfWork<'a> {
    pub fn begin(tables: &'a Tables) -> Self {
        Self {
            products: tables.products.begin(),
            orders: tables.orders.begin(),
            order_items: tables.order_items.begin(),
            now: Utc::now(),
        }
    }

    pub fn products(&mut self) -> &mut TableTx<'a, Product> {
        &mut self.products
    }

    pub fn orders(&mut self) -> &mut TableTx<'a, OrderRecord> {
        &mut self.orders
    }

    pub fn order_items(&mut self) -> &mut TableTx<'a, OrderItem> {
        &mut self.order_items
    }

    /// Timestamp of the transaction; every row it touches gets the same one.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn into_changes(self) -> Changes {
        Changes {
            products: self.products.into_writes(),
            orders: self.orders.into_writes(),
            order_items: self.order_items.into_writes(),
        }
    }
}

struct Changes {
    products: TableWrites<Product>,
    orders: TableWrites<OrderRecord>,
    order_items: TableWrites<OrderItem>,
}

/// Creates the store actor and its handle.
pub fn new(buffer_size: usize) -> (StoreActor<Tables>, Store) {
    let (actor, client) = StoreActor::new(buffer_size, Tables::default());
    (actor, Store::new(client))
}

/// Cloneable handle to the order store.
#[derive(Clone)]
pub struct Store {
    client: StoreClient<Tables>,
}

impl Store {
    pub fn new(client: StoreClient<Tables>) -> Self {
        Self { client }
    }

    /// Runs `f` against committed state.
    pub async fn read<T, F>(&self, ctx: &RequestContext, op: &'static str, f: F) -> Result<T, FrameworkError>
    where
        T: Send + 'static,
        F: FnOnce(&Tables) -> T + Send + 'static,
    {
        self.client.read(ctx, op, f).await
    }

    /// Runs `work` as one all-or-nothing unit.
    ///
    /// `Ok` commits every staged write, sequence advances included. `Err` discards
    /// them, leaving the store exactly as it was.
    pub async fn transact<T, E, F>(&self, ctx: &RequestContext, op: &'static str, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<FrameworkError> + Send + 'static,
        F: FnOnce(&mut UnitOfWork<'_>) -> Result<T, E> + Send + 'static,
    {
        self.client
            .transaction(ctx, op, move |tables: &mut Tables| {
                let mut uow = UnitOfWork::begin(tables);
                match work(&mut uow) {
                    Ok(value) => {
                        let changes = uow.into_changes();
                        tables.apply(changes);
                        (Ok(value), TxOutcome::Committed)
                    }
                    Err(e) => (Err(e), TxOutcome::RolledBack),
                }
            })
            .await
            .map_err(E::from)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Record;
    use crate::model::ProductId;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Store(FrameworkError),
        Rejected,
    }

    impl From<FrameworkError> for TestError {
        fn from(e: FrameworkError) -> Self {
            TestError::Store(e)
        }
    }

    fn insert_product(uow: &mut UnitOfWork<'_>, name: &str, stock: i64) -> Product {
        let now = uow.now();
        uow.products().insert_with(|id| Product {
            id,
            name: name.to_string(),
            price: 100,
            stock,
            created_at: now,
            updated_at: now,
        })
    }

    #[tokio::test]
    async fn failed_transaction_leaves_no_trace() {
        let (actor, store) = new(8);
        tokio::spawn(actor.run());
        let ctx = RequestContext::new();

        let result: Result<(), TestError> = store
            .transact(&ctx, "reject", |uow| {
                insert_product(uow, "ghost", 1);
                Err(TestError::Rejected)
            })
            .await;
        assert_eq!(result, Err(TestError::Rejected));

        let product: Result<Product, TestError> = store
            .transact(&ctx, "accept", |uow| Ok(insert_product(uow, "real", 5)))
            .await;
        assert_eq!(product.unwrap().id, ProductId(1));

        let names = store
            .read(&ctx, "names", |t| t.products.iter().map(|p| p.name.clone()).collect::<Vec<_>>())
            .await
            .unwrap();
        assert_eq!(names, vec!["real".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_context_never_reaches_the_store() {
        let (actor, store) = new(8);
        tokio::spawn(actor.run());
        let ctx = RequestContext::new();
        ctx.cancel();

        let result: Result<Product, TestError> = store
            .transact(&ctx, "insert", |uow| Ok(insert_product(uow, "late", 1)))
            .await;
        assert_eq!(result, Err(TestError::Store(FrameworkError::Cancelled)));

        let count = store
            .read(&RequestContext::new(), "count", |t| t.products.len())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn relations_log_under_their_own_names() {
        assert_eq!(
            [Product::TABLE, OrderRecord::TABLE, OrderItem::TABLE],
            ["products", "orders", "order_items"]
        );
    }
}
