//! # Order Repository
//!
//! Persistence for orders and their line items. Every write is one store
//! transaction that also carries the stock mutations belonging to it, so an
//! order and the stock it reserved or released can never disagree.
//!
//! Reads load line items eagerly; a listing groups all items in a single pass
//! instead of querying per order.

use crate::framework::RequestContext;
use crate::model::{
    NewOrder, Order, OrderId, OrderItem, OrderRecord, OrderSortField, OrderStatus, SortDirection,
};
use crate::order::OrderError;
use crate::product::StockMutation;
use crate::store::{Store, Tables, UnitOfWork};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct OrderRepository {
    store: Store,
}

impl OrderRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Applies `stock_mutations`, then inserts the order and its items.
    #[instrument(skip_all, fields(user_id = %new_order.user_id, lines = new_order.items.len()))]
    pub async fn create_with_transaction(
        &self,
        ctx: &RequestContext,
        new_order: NewOrder,
        stock_mutations: Vec<StockMutation>,
    ) -> Result<Order, OrderError> {
        self.store
            .transact(ctx, "create_order", move |uow| -> Result<Order, OrderError> {
                for mutation in stock_mutations {
                    mutation(uow)?;
                }
                Ok(insert_order(uow, new_order))
            })
            .await
    }

    /// Loads the stored order, lets `mutate` change its status and return the
    /// stock mutations that go with the change, and commits both together.
    ///
    /// `mutate` sees the row as stored at commit time, so checks it performs
    /// cannot be invalidated by a concurrent writer.
    #[instrument(skip(self, ctx, mutate))]
    pub async fn update_with_transaction<F>(
        &self,
        ctx: &RequestContext,
        id: OrderId,
        mutate: F,
    ) -> Result<Order, OrderError>
    where
        F: FnOnce(&mut Order) -> Result<Vec<StockMutation>, OrderError> + Send + 'static,
    {
        self.store
            .transact(ctx, "update_order", move |uow| -> Result<Order, OrderError> {
                let mut order = load_order(uow, id).ok_or(OrderError::OrderNotFound(id))?;
                let stock_mutations = mutate(&mut order)?;
                for mutation in stock_mutations {
                    mutation(uow)?;
                }
                order.updated_at = uow.now();
                uow.orders().put(order.record());
                Ok(order)
            })
            .await
    }

    /// Removes the order and its items. `plan` decides, from the stored order,
    /// which stock mutations accompany the removal.
    #[instrument(skip(self, ctx, plan))]
    pub async fn delete_with_transaction<F>(
        &self,
        ctx: &RequestContext,
        id: OrderId,
        plan: F,
    ) -> Result<Order, OrderError>
    where
        F: FnOnce(&Order) -> Result<Vec<StockMutation>, OrderError> + Send + 'static,
    {
        self.store
            .transact(ctx, "delete_order", move |uow| -> Result<Order, OrderError> {
                let order = load_order(uow, id).ok_or(OrderError::OrderNotFound(id))?;
                for mutation in plan(&order)? {
                    mutation(uow)?;
                }
                for item in &order.items {
                    uow.order_items().delete(item.id);
                }
                uow.orders().delete(id);
                debug!(order_id = %id, items = order.items.len(), "Order rows staged for removal");
                Ok(order)
            })
            .await
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self
            .store
            .read(ctx, "find_order", move |tables| {
                let record = tables.orders.get(id)?.clone();
                let items = tables
                    .order_items
                    .iter()
                    .filter(|item| item.order_id == id)
                    .cloned()
                    .collect();
                Some(Order::assemble(record, items))
            })
            .await?)
    }

    /// One page of orders with items, plus the total number of orders.
    ///
    /// Ties on the sort key are broken by id in the same direction.
    pub async fn find_all_with_pagination(
        &self,
        ctx: &RequestContext,
        offset: usize,
        limit: usize,
        field: OrderSortField,
        direction: SortDirection,
    ) -> Result<(Vec<Order>, u64), OrderError> {
        Ok(self
            .store
            .read(ctx, "list_orders", move |tables| {
                let mut orders = load_all_orders(tables);
                orders.sort_by(|a, b| {
                    let ordering = compare_orders(a, b, field);
                    match direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                });
                let total = orders.len() as u64;
                let page = orders.into_iter().skip(offset).take(limit).collect();
                (page, total)
            })
            .await?)
    }
}

fn insert_order(uow: &mut UnitOfWork<'_>, new_order: NewOrder) -> Order {
    let now = uow.now();
    let total_price = new_order.total_price();
    let record = uow.orders().insert_with(|id| OrderRecord {
        id,
        user_id: new_order.user_id,
        total_price,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    });
    let items = new_order
        .items
        .into_iter()
        .map(|line| {
            uow.order_items().insert_with(|id| OrderItem {
                id,
                order_id: record.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            })
        })
        .collect();
    Order::assemble(record, items)
}

fn load_order(uow: &mut UnitOfWork<'_>, id: OrderId) -> Option<Order> {
    let record = uow.orders().get(id)?;
    let items = uow.order_items().filter(|item| item.order_id == id);
    Some(Order::assemble(record, items))
}

fn load_all_orders(tables: &Tables) -> Vec<Order> {
    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in tables.order_items.iter() {
        items_by_order.entry(item.order_id).or_default().push(item.clone());
    }
    tables
        .orders
        .iter()
        .map(|record| {
            let items = items_by_order.remove(&record.id).unwrap_or_default();
            Order::assemble(record.clone(), items)
        })
        .collect()
}

fn compare_orders(a: &Order, b: &Order, field: OrderSortField) -> Ordering {
    let primary = match field {
        OrderSortField::Id => Ordering::Equal,
        OrderSortField::UserId => a.user_id.cmp(&b.user_id),
        OrderSortField::ProductId => a.lead_product_id().cmp(&b.lead_product_id()),
        OrderSortField::Quantity => a.total_quantity().cmp(&b.total_quantity()),
        OrderSortField::TotalPrice => a.total_price.cmp(&b.total_price),
        OrderSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}
