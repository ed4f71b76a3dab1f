use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::app_system::EngineConfig;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{Order, Product, User};
use crate::notifications::Publisher;

/// Sequential ids of the form `<prefix>_<n>`, starting at 1.
fn id_sequence(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(config: EngineConfig, publisher: Arc<dyn Publisher>) -> Self {
        let timeout = config.request_timeout();

        // 1. User directory
        let (user_actor, user_resource_client) =
            ResourceActor::<User>::new(config.channel_buffer, id_sequence("user"));
        let user_client = UserClient::new(user_resource_client.with_timeout(timeout));
        let user_handle = tokio::spawn(user_actor.run());

        // 2. Catalog
        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(config.channel_buffer, id_sequence("product"));
        let product_client = ProductClient::new(product_resource_client.with_timeout(timeout));
        let product_handle = tokio::spawn(product_actor.run());

        // 3. Orders
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(config.channel_buffer, id_sequence("order"));
        let order_handle = tokio::spawn(order_actor.run());

        info!(
            channel_buffer = config.channel_buffer,
            timeout_ms = config.request_timeout_ms,
            "Order system started"
        );

        let order_client = OrderClient::new(
            order_resource_client.with_timeout(timeout),
            user_client.clone(),
            product_client.clone(),
            publisher,
            config,
        );

        Self {
            order_client,
            user_client,
            product_client,
            handles: vec![user_handle, product_handle, order_handle],
        }
    }

    /// Drops every client, which closes the actor channels, then waits for the actors to exit.
    ///
    /// Clones of the clients held elsewhere keep their actors alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
