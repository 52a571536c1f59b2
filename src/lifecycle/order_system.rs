use crate::framework::RequestContext;
use crate::lifecycle::SystemConfig;
use crate::order::{OrderRepository, OrderService};
use crate::product::{ProductService, StockLedger};
use crate::store;
use tracing::{error, info};

/// The runtime orchestrator for the order engine.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: starting the store actor and stopping it cleanly
/// - **Dependency Wiring**: handing every service a handle to the same store
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(SystemConfig::from_env());
/// let ctx = system.context();
///
/// let product = system.products.create_product(&ctx, ProductCreate::new("Lamp", 1999, 5)).await?;
/// let order = system
///     .orders
///     .create_order(&ctx, CreateOrderRequest::new(vec![OrderLine::new(product.id, 2)]), UserId(1))
///     .await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Order lifecycle: create, read, list, status changes, delete
    pub orders: OrderService,

    /// Catalog management
    pub products: ProductService,

    /// Direct stock adjustments (restocking, corrections)
    pub ledger: StockLedger,

    config: SystemConfig,

    /// Store actor task (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl OrderSystem {
    /// Spawns the store actor and wires the services on top of it.
    pub fn new(config: SystemConfig) -> Self {
        let (actor, store) = store::new(config.store_buffer);
        let handle = tokio::spawn(actor.run());

        let products = ProductService::new(store.clone());
        let ledger = StockLedger::new(store.clone());
        let orders = OrderService::new(OrderRepository::new(store), products.clone());

        info!(store_buffer = config.store_buffer, "Order system started");
        Self {
            orders,
            products,
            ledger,
            config,
            handle,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// A request context with the configured deadline.
    pub fn context(&self) -> RequestContext {
        self.config.request_context()
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the services closes the store mailbox once every clone is gone;
    /// the actor drains what is queued and exits. Clones held elsewhere keep the
    /// store alive, so drop them first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.orders);
        drop(self.products);
        drop(self.ledger);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
