//! Demo run of the order engine: stock a catalog, place orders, pay one,
//! cancel another, and print the resulting listing.

use order_engine::lifecycle::{setup_tracing, OrderSystem, SystemConfig};
use order_engine::model::{
    CreateOrderRequest, OrderLine, PaginationQuery, ProductCreate, UpdateOrderRequest, UserId,
};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenv::dotenv().ok();
    let config = SystemConfig::from_env();
    setup_tracing(config.log_format);

    info!("Starting order engine demo");
    let system = OrderSystem::new(config);
    info!(request_timeout = ?system.config().request_timeout, "Requests carry the configured deadline");
    let ctx = system.context();
    let alice = UserId(1);
    let bob = UserId(2);

    let lamp = system
        .products
        .create_product(&ctx, ProductCreate::new("Desk Lamp", 2_499, 10))
        .await
        .map_err(|e| e.to_string())?;
    let bulb = system
        .products
        .create_product(&ctx, ProductCreate::new("LED Bulb", 399, 40))
        .await
        .map_err(|e| e.to_string())?;
    info!(lamp = %lamp.id, bulb = %bulb.id, "Catalog stocked");

    let span = tracing::info_span!("order_processing");
    let paid = async {
        let order = system
            .orders
            .create_order(
                &ctx,
                CreateOrderRequest::new(vec![OrderLine::new(lamp.id, 2), OrderLine::new(bulb.id, 6)]),
                alice,
            )
            .await?;
        system
            .orders
            .update_order(&ctx, order.id, UpdateOrderRequest::status("paid"), alice)
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    info!(order_id = %paid.id, total_price = paid.total_price, status = %paid.status, "Order paid");

    let span = tracing::info_span!("order_cancellation");
    let cancelled = async {
        let order = system
            .orders
            .create_order(&ctx, CreateOrderRequest::new(vec![OrderLine::new(lamp.id, 3)]), bob)
            .await?;
        system
            .orders
            .update_order(&ctx, order.id, UpdateOrderRequest::status("cancelled"), bob)
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    info!(order_id = %cancelled.id, status = %cancelled.status, "Order cancelled, stock restored");

    match system
        .orders
        .create_order(&ctx, CreateOrderRequest::new(vec![OrderLine::new(lamp.id, 50)]), bob)
        .await
    {
        Ok(order) => info!(order_id = %order.id, "Unexpectedly accepted oversized order"),
        Err(e) => error!(error = %e, code = e.code(), status = e.status_code(), "Oversized order rejected"),
    }

    let listing = system
        .orders
        .get_all_orders_with_query(&ctx, &PaginationQuery::new().with_sort_by("total_price"))
        .await
        .map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())?;
    println!("{json}");

    let lamp = system
        .products
        .get_product_by_id(&ctx, lamp.id)
        .await
        .map_err(|e| e.to_string())?;
    info!(product_id = %lamp.id, stock = lamp.stock, "Final lamp stock");

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
