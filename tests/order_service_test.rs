use async_trait::async_trait;
use chrono::Utc;
use order_engine::framework::mock::{create_mock_client, expect_read, expect_transaction, MockStore};
use order_engine::framework::{FrameworkError, RequestContext, TxOutcome};
use order_engine::model::{
    CreateOrderRequest, OrderId, OrderItem, OrderLine, OrderRecord, OrderStatus, Product, ProductId,
    UpdateOrderRequest, UserId,
};
use order_engine::order::{OrderError, OrderRepository, OrderService};
use order_engine::product::{ProductCatalog, ProductError};
use order_engine::store::{Store, Tables};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ALICE: UserId = UserId(1);

/// Catalog stand-in with canned answers and a call counter.
#[derive(Clone, Default)]
struct MockCatalog {
    answers: Arc<HashMap<ProductId, Result<Product, ProductError>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCatalog {
    fn with(answers: Vec<(ProductId, Result<Product, ProductError>)>) -> Self {
        Self {
            answers: Arc::new(answers.into_iter().collect()),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for MockCatalog {
    async fn get_product_by_id(&self, _ctx: &RequestContext, id: ProductId) -> Result<Product, ProductError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(&id)
            .cloned()
            .unwrap_or(Err(ProductError::NotFound(id)))
    }
}

fn product(id: u64, price: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId(id),
        name: format!("Product {id}"),
        price,
        stock,
        created_at: now,
        updated_at: now,
    }
}

/// Puts a product with `stock` units into the fixture.
fn seed_product(tables: &mut Tables, price: i64, stock: i64) -> ProductId {
    let mut tx = tables.products.begin();
    let row = tx.insert_with(|id| Product { id, ..product(0, price, stock) });
    let writes = tx.into_writes();
    tables.products.apply(writes);
    row.id
}

/// Puts a one-line order for `quantity` units of `product_id` into the fixture.
fn seed_order(tables: &mut Tables, product_id: ProductId, quantity: i64, status: OrderStatus) -> OrderId {
    let now = Utc::now();
    let mut orders = tables.orders.begin();
    let record = orders.insert_with(|id| OrderRecord {
        id,
        user_id: ALICE,
        total_price: quantity * 100,
        status,
        created_at: now,
        updated_at: now,
    });
    let writes = orders.into_writes();
    tables.orders.apply(writes);

    let mut items = tables.order_items.begin();
    items.insert_with(|id| OrderItem {
        id,
        order_id: record.id,
        product_id,
        quantity,
        unit_price: 100,
        subtotal: quantity * 100,
    });
    let writes = items.into_writes();
    tables.order_items.apply(writes);
    record.id
}

fn set_status(tables: &mut Tables, id: OrderId, status: OrderStatus) {
    let mut orders = tables.orders.begin();
    if let Some(mut record) = orders.get(id) {
        record.status = status;
        orders.put(record);
    }
    let writes = orders.into_writes();
    tables.orders.apply(writes);
}

fn set_stock(tables: &mut Tables, id: ProductId, stock: i64) {
    let mut products = tables.products.begin();
    if let Some(mut row) = products.get(id) {
        row.stock = stock;
        products.put(row);
    }
    let writes = products.into_writes();
    tables.products.apply(writes);
}

fn stock(tables: &Tables, id: ProductId) -> Option<i64> {
    tables.products.get(id).map(|p| p.stock)
}

/// Real order service, mocked catalog and store.
///
/// The catalog prices the lines; the store runs the transaction against its
/// fixture, so the debit is observable in the fixture afterwards.
#[tokio::test]
async fn test_create_order_prices_from_catalog_and_debits_store() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 250, 10);
    let catalog = MockCatalog::with(vec![(lamp, Ok(product(lamp.0, 250, 10)))]);

    let mut mock = MockStore::new(tables);
    mock.expect_transaction().with_op("create_order").run();
    let service = OrderService::new(OrderRepository::new(Store::new(mock.client())), catalog.clone());

    let order = service
        .create_order(
            &RequestContext::new(),
            CreateOrderRequest::new(vec![OrderLine::new(lamp, 2), OrderLine::new(lamp, 1)]),
            ALICE,
        )
        .await
        .expect("Failed to create order");

    assert_eq!(order.total_price, 750);
    assert_eq!(order.items.len(), 2);
    assert!(order.items.iter().all(|item| item.unit_price == 250));
    // One lookup per distinct product.
    assert_eq!(catalog.calls(), 1);
    assert_eq!(stock(&mock.state(), lamp), Some(7));
    assert_eq!(mock.state().orders.len(), 1);
    assert_eq!(mock.state().order_items.len(), 2);

    mock.verify();
}

/// The catalog saw enough stock, but by the time the transaction runs there is
/// less. The in-transaction check must reject and leave no rows behind.
#[tokio::test]
async fn test_stale_catalog_stock_is_caught_inside_transaction() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 1);
    let catalog = MockCatalog::with(vec![(lamp, Ok(product(lamp.0, 100, 10)))]);

    let mut mock = MockStore::new(tables);
    mock.expect_transaction().with_op("create_order").run();
    let service = OrderService::new(OrderRepository::new(Store::new(mock.client())), catalog);

    let err = service
        .create_order(
            &RequestContext::new(),
            CreateOrderRequest::new(vec![OrderLine::new(lamp, 3)]),
            ALICE,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OrderError::InsufficientStock {
            product_id: lamp,
            requested: 3,
            available: 1
        }
    );
    assert_eq!(stock(&mock.state(), lamp), Some(1));
    assert!(mock.state().orders.is_empty());
    assert!(mock.state().order_items.is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_unknown_product_never_reaches_store() {
    let catalog = MockCatalog::default();
    let mock = MockStore::new(Tables::default());
    let service = OrderService::new(OrderRepository::new(Store::new(mock.client())), catalog.clone());

    let err = service
        .create_order(
            &RequestContext::new(),
            CreateOrderRequest::new(vec![OrderLine::new(ProductId(9), 1)]),
            ALICE,
        )
        .await
        .unwrap_err();

    assert_eq!(err, OrderError::ProductNotFound(ProductId(9)));
    assert_eq!(err.status_code(), 404);
    assert_eq!(catalog.calls(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_catalog_infrastructure_failure_propagates() {
    let catalog = MockCatalog::with(vec![(
        ProductId(1),
        Err(ProductError::Store(FrameworkError::ActorClosed)),
    )]);
    let mock = MockStore::new(Tables::default());
    let service = OrderService::new(OrderRepository::new(Store::new(mock.client())), catalog);

    let err = service
        .create_order(
            &RequestContext::new(),
            CreateOrderRequest::new(vec![OrderLine::new(ProductId(1), 1)]),
            ALICE,
        )
        .await
        .unwrap_err();

    assert_eq!(err, OrderError::Store(FrameworkError::ActorClosed));
    assert_eq!(err.code(), "DATABASE_ERROR");
    mock.verify();
}

#[tokio::test]
async fn test_store_crash_during_create_surfaces_as_store_error() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 10);
    let catalog = MockCatalog::with(vec![(lamp, Ok(product(lamp.0, 100, 10)))]);

    let mut mock = MockStore::new(tables);
    mock.expect_transaction().with_op("create_order").return_dropped();
    let service = OrderService::new(OrderRepository::new(Store::new(mock.client())), catalog);

    let err = service
        .create_order(
            &RequestContext::new(),
            CreateOrderRequest::new(vec![OrderLine::new(lamp, 2)]),
            ALICE,
        )
        .await
        .unwrap_err();

    assert_eq!(err, OrderError::Store(FrameworkError::ActorDropped));
    assert_eq!(err.status_code(), 500);
    assert_eq!(stock(&mock.state(), lamp), Some(10));
    mock.verify();
}

#[tokio::test]
async fn test_cancelled_context_skips_catalog_and_store() {
    let catalog = MockCatalog::with(vec![(ProductId(1), Ok(product(1, 100, 10)))]);
    let (client, mut receiver) = create_mock_client::<Tables>(4);
    let service = OrderService::new(OrderRepository::new(Store::new(client)), catalog.clone());

    let ctx = RequestContext::new();
    ctx.cancel();
    let err = service
        .create_order(&ctx, CreateOrderRequest::new(vec![OrderLine::new(ProductId(1), 1)]), ALICE)
        .await
        .unwrap_err();

    assert_eq!(err, OrderError::Store(FrameworkError::Cancelled));
    assert_eq!(catalog.calls(), 0);
    assert!(receiver.try_recv().is_err());
}

/// A payment races a cancellation: the service read the order as PENDING, but
/// the cancellation commits before the payment's transaction runs.
#[tokio::test]
async fn test_transition_is_rechecked_against_stored_status() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 7);
    let order_id = seed_order(&mut tables, lamp, 3, OrderStatus::Pending);

    let (client, mut receiver) = create_mock_client::<Tables>(4);
    let service = OrderService::new(OrderRepository::new(Store::new(client)), MockCatalog::default());
    let task = tokio::spawn(async move {
        service
            .update_order(&RequestContext::new(), order_id, UpdateOrderRequest::status("PAID"), ALICE)
            .await
    });

    let (op, job) = expect_read(&mut receiver).await.expect("Expected a read");
    assert_eq!(op, "find_order");
    job(&tables);

    // The competing cancellation lands here.
    set_status(&mut tables, order_id, OrderStatus::Cancelled);
    set_stock(&mut tables, lamp, 10);

    let (op, job) = expect_transaction(&mut receiver).await.expect("Expected a transaction");
    assert_eq!(op, "update_order");
    assert_eq!(job(&mut tables), TxOutcome::RolledBack);

    let err = task.await.expect("Task panicked").unwrap_err();
    assert_eq!(err, OrderError::CannotChangeCancelledOrderStatus);
    assert_eq!(tables.orders.get(order_id).map(|o| o.status), Some(OrderStatus::Cancelled));
    assert_eq!(stock(&tables, lamp), Some(10));
}

/// Two cancellations of the same order: the one that commits second finds the
/// order already cancelled and must not credit stock again.
#[tokio::test]
async fn test_racing_cancellation_does_not_restock_twice() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 7);
    let order_id = seed_order(&mut tables, lamp, 3, OrderStatus::Pending);

    let (client, mut receiver) = create_mock_client::<Tables>(4);
    let service = OrderService::new(OrderRepository::new(Store::new(client)), MockCatalog::default());
    let task = tokio::spawn(async move {
        service
            .update_order(&RequestContext::new(), order_id, UpdateOrderRequest::status("CANCELLED"), ALICE)
            .await
    });

    let (_, job) = expect_read(&mut receiver).await.expect("Expected a read");
    job(&tables);

    set_status(&mut tables, order_id, OrderStatus::Cancelled);
    set_stock(&mut tables, lamp, 10);

    let (_, job) = expect_transaction(&mut receiver).await.expect("Expected a transaction");
    assert_eq!(job(&mut tables), TxOutcome::Committed);

    let order = task.await.expect("Task panicked").expect("Cancel failed");
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&tables, lamp), Some(10));
}

#[tokio::test]
async fn test_delete_of_vanished_order_reports_not_found() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 7);
    let order_id = seed_order(&mut tables, lamp, 3, OrderStatus::Pending);

    let (client, mut receiver) = create_mock_client::<Tables>(4);
    let service = OrderService::new(OrderRepository::new(Store::new(client)), MockCatalog::default());
    let task = tokio::spawn(async move { service.delete_order(&RequestContext::new(), order_id).await });

    let (_, job) = expect_read(&mut receiver).await.expect("Expected a read");
    job(&tables);

    // Deleted by someone else in between.
    let mut tables = Tables::default();
    let (op, job) = expect_transaction(&mut receiver).await.expect("Expected a transaction");
    assert_eq!(op, "delete_order");
    assert_eq!(job(&mut tables), TxOutcome::RolledBack);

    let err = task.await.expect("Task panicked").unwrap_err();
    assert_eq!(err, OrderError::OrderNotFound(order_id));
    assert!(tables.products.is_empty());
}

/// The caller gives up while the transaction is still queued. When the store
/// reaches it, the job must abort before touching any row.
#[tokio::test]
async fn test_cancellation_while_queued_aborts_transaction() {
    let mut tables = Tables::default();
    let lamp = seed_product(&mut tables, 100, 10);
    let catalog = MockCatalog::with(vec![(lamp, Ok(product(lamp.0, 100, 10)))]);

    let (client, mut receiver) = create_mock_client::<Tables>(4);
    let service = OrderService::new(OrderRepository::new(Store::new(client)), catalog);
    let ctx = RequestContext::new();
    let task_ctx = ctx.clone();
    let task = tokio::spawn(async move {
        service
            .create_order(&task_ctx, CreateOrderRequest::new(vec![OrderLine::new(lamp, 4)]), ALICE)
            .await
    });

    let (op, job) = expect_transaction(&mut receiver).await.expect("Expected a transaction");
    assert_eq!(op, "create_order");
    ctx.cancel();
    assert_eq!(job(&mut tables), TxOutcome::Aborted);

    let err = task.await.expect("Task panicked").unwrap_err();
    assert_eq!(err, OrderError::Store(FrameworkError::Cancelled));
    assert_eq!(stock(&tables, lamp), Some(10));
    assert!(tables.orders.is_empty());
    assert!(tables.order_items.is_empty());
}
