use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use delivery_orders::app_system::{setup_tracing, EngineConfig, OrderSystem};
use delivery_orders::domain::{
    Category, CreateOrderRequest, Destination, LocalizedName, OrderItemRequest, PickupLocation, Principal,
    ProductCreate, Role, UserCreate,
};
use delivery_orders::notifications::BroadcastPublisher;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = EngineConfig::from_env();
    info!(?config, "Starting delivery order engine");

    let publisher = BroadcastPublisher::new(config.event_capacity);
    let mut events = publisher.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(notification) = events.recv().await {
            info!(topic = %notification.topic, event = %notification.event, "Notification received");
        }
    });

    let system = OrderSystem::new(config, Arc::new(publisher));

    // Seed accounts and catalog
    let span = tracing::info_span!("seeding");
    let (vendor, passenger, driver, bread, milk) = async {
        let vendor_id = system
            .user_client
            .create_user(UserCreate::new(Role::Vendor, "Lineo", "Mohapi").with_shop("Lineo's Kitchen"))
            .await
            .map_err(|e| e.to_string())?;
        let passenger_id = system
            .user_client
            .create_user(UserCreate::new(Role::Passenger, "Thabo", "Mokoena").with_phone("+26658000000"))
            .await
            .map_err(|e| e.to_string())?;
        let driver_id = system
            .user_client
            .create_user(UserCreate::new(Role::Driver, "Palesa", "Nthako").with_vehicle("LS-4411", "Toyota Quantum"))
            .await
            .map_err(|e| e.to_string())?;

        let bread = system
            .product_client
            .create_product(ProductCreate::new(
                vendor_id.clone(),
                LocalizedName::new("Bread", "Bohobe"),
                Category::Food,
                Decimal::from(10),
                20,
            ))
            .await
            .map_err(|e| e.to_string())?;
        let milk = system
            .product_client
            .create_product(ProductCreate::new(
                vendor_id.clone(),
                LocalizedName::new("Milk", "Lebese"),
                Category::Drinks,
                Decimal::from(5),
                10,
            ))
            .await
            .map_err(|e| e.to_string())?;

        info!(%vendor_id, %passenger_id, %driver_id, "Seed data created");
        Ok::<_, String>((
            Principal::new(vendor_id, Role::Vendor),
            Principal::new(passenger_id, Role::Passenger),
            Principal::new(driver_id, Role::Driver),
            bread,
            milk,
        ))
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("order_lifecycle");
    let lifecycle = async {
        let request = CreateOrderRequest::new(
            vec![OrderItemRequest::new(bread, 3), OrderItemRequest::new(milk, 1)],
            Destination::at("Ha Abia, Maseru"),
            PickupLocation::at("Pioneer Mall, Maseru"),
        );
        let view = system.order_client.create_order(Some(&passenger), request).await?;
        let order_id = view.order.id.clone();
        info!(%order_id, total = %view.order.total_amount, "Order placed");

        for status in ["confirmed", "preparing", "ready"] {
            system
                .order_client
                .update_status(Some(&vendor), order_id.clone(), status)
                .await?;
        }

        system
            .order_client
            .assign_driver(Some(&vendor), order_id.clone(), driver.id.clone())
            .await?;
        let done = system
            .order_client
            .update_status(Some(&driver), order_id.clone(), "completed")
            .await?;
        info!(%order_id, status = %done.order.status, "Order delivered");
        Ok::<_, delivery_orders::order_actor::OrderError>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = lifecycle {
        error!(error = %e, "Order lifecycle failed");
    }

    // Shutdown system gracefully
    system.shutdown().await?;
    listener.abort();

    info!("Application completed successfully");
    Ok(())
}
