use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the catalog (Product actor).
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self), fields(vendor_id = %params.vendor_id))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Reserves every `(product_id, quantity)` pair in one catalog transaction.
    ///
    /// Either all reservations are applied or none are. If the catalog commits only
    /// after this call has timed out, the late reservation is released again, since
    /// the caller has already been told it failed.
    #[instrument(skip(self, reservations), fields(lines = reservations.len()))]
    pub async fn reserve_items(&self, reservations: Vec<(String, u32)>) -> Result<(), ProductError> {
        debug!("Sending request");
        let actions = reservations
            .iter()
            .map(|(id, quantity)| (id.clone(), ProductAction::Reserve(*quantity)))
            .collect();
        let catalog = self.clone();
        self.inner
            .transact_settled(actions, move |late| async move {
                if late.is_ok() {
                    warn!("Reservation committed after the request timed out, releasing it");
                    catalog.restore_items(&reservations).await;
                }
            })
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restore_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::Restore(quantity)).await? {
            ProductActionResult::Restore(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Best-effort restoration of `(product_id, quantity)` pairs.
    ///
    /// Products that no longer exist are skipped. Returns how many lines were restored.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn restore_items(&self, lines: &[(String, u32)]) -> usize {
        let mut restored = 0;
        for (id, quantity) in lines {
            match self.restore_stock(id.clone(), *quantity).await {
                Ok(level) => {
                    restored += 1;
                    debug!(product_id = %id, quantity, stock_level = level, "Stock restored");
                }
                Err(ProductError::NotFound(_)) => {
                    warn!(product_id = %id, "Product no longer exists, skipping stock restore");
                }
                Err(e) => error!(product_id = %id, error = %e, "Stock restore failed"),
            }
        }
        info!(restored, "Stock restoration finished");
        restored
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {:?}", result))
}
