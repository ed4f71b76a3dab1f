use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::app_system::EngineConfig;
use crate::clients::{ProductClient, UserClient};
use crate::domain::{
    CreateOrderRequest, ListQuery, Order, OrderCreate, OrderItem, OrderItemRequest, OrderStatus, OrderView, Principal,
};
use crate::guard::{self, ListScope};
use crate::notifications::{OrderEvent, PublishError, Publisher, Topic};
use crate::order_actor::{compute_stats, OrderAction, OrderError, OrderStats, StatsRange, TransitionOutcome};

/// Client for the order lifecycle.
///
/// Orchestrates the catalog and user directory around the order actor:
/// reservation on creation, authorization, table-driven status changes,
/// stock compensation on cancellation and event fan-out.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    product_client: ProductClient,
    publisher: Arc<dyn Publisher>,
    config: EngineConfig,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        user_client: UserClient,
        product_client: ProductClient,
        publisher: Arc<dyn Publisher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner,
            user_client,
            product_client,
            publisher,
            config,
        }
    }

    /// Places an order for the calling passenger.
    ///
    /// Every item is resolved and checked before any stock moves; the
    /// reservation itself is a single catalog transaction, and it is released
    /// again if the order cannot be persisted.
    #[instrument(skip(self, principal, request), fields(items = request.items.len(), is_urgent = request.is_urgent))]
    pub async fn create_order(
        &self,
        principal: Option<&Principal>,
        request: CreateOrderRequest,
    ) -> Result<OrderView, OrderError> {
        let principal = guard::authenticate(principal)?;
        guard::ensure(guard::can_create(principal), "Only passengers can place orders")?;
        request.validate().map_err(OrderError::ValidationError)?;
        info!(passenger_id = %principal.id, "Processing create_order request");

        // Step 1: Resolve items (read only)
        let (vendor_id, items) = self.resolve_items(&request.items).await?;

        // Step 2: Reserve stock for all items at once
        let reservations: Vec<(String, u32)> = items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();
        if let Err(e) = self.product_client.reserve_items(reservations.clone()).await {
            error!(error = %e, "Stock reservation failed");
            return Err(e.into());
        }
        info!("Stock reserved successfully");

        // Step 3: Persist the order, releasing the reservation only once it is known not to be stored
        let params = OrderCreate {
            passenger_id: principal.id.clone(),
            vendor_id,
            items,
            delivery_fee: self.config.delivery_fee(request.is_urgent),
            is_urgent: request.is_urgent,
            pickup_location: request.pickup_location,
            destination: request.destination,
            notes: request.notes,
            payment_method: request.payment_method,
            created_at: Utc::now(),
        };
        let products = self.product_client.clone();
        let held = reservations.clone();
        let settle = move |late: Result<String, FrameworkError<OrderError>>| async move {
            match late {
                Ok(order_id) => warn!(%order_id, "Order persisted after the request timed out, keeping its stock"),
                Err(e) => {
                    warn!(error = %e, "Order was not persisted, releasing reserved stock");
                    products.restore_items(&held).await;
                }
            }
        };
        let order_id = match self.inner.create_settled(params, settle).await {
            Ok(id) => id,
            Err(e) if e.outcome_unknown() => {
                // The order actor may still commit; the late reply decides the stock.
                error!(error = %e, "Persisting order timed out");
                return Err(e.into());
            }
            Err(e) => {
                error!(error = %e, "Persisting order failed, releasing reserved stock");
                self.product_client.restore_items(&reservations).await;
                return Err(e.into());
            }
        };

        let order = self.fetch(order_id).await?;
        info!(order_id = %order.id, total = %order.total_amount, "Order created successfully");

        let view = self.view(order).await;
        self.notify(Topic::Vendor(view.order.vendor_id.clone()), OrderEvent::NewOrder, &view);
        Ok(view)
    }

    #[instrument(skip(self, principal))]
    pub async fn get_order(&self, principal: Option<&Principal>, order_id: String) -> Result<OrderView, OrderError> {
        let principal = guard::authenticate(principal)?;
        let order = self.fetch(order_id).await?;
        guard::ensure(guard::can_view(principal, &order), "You are not authorized to view this order")?;
        Ok(self.view(order).await)
    }

    /// The caller's own orders: placed, sold or delivered depending on role; everything for admins.
    #[instrument(skip(self, principal))]
    pub async fn list_orders(&self, principal: Option<&Principal>, query: ListQuery) -> Result<Vec<OrderView>, OrderError> {
        let principal = guard::authenticate(principal)?;
        self.query(guard::list_scope(principal), &query).await
    }

    #[instrument(skip(self, principal))]
    pub async fn list_all_orders(
        &self,
        principal: Option<&Principal>,
        query: ListQuery,
    ) -> Result<Vec<OrderView>, OrderError> {
        guard::require_admin(guard::authenticate(principal)?)?;
        self.query(ListScope::All, &query).await
    }

    /// Moves an order to `target` (given by its wire name) per the transition table.
    #[instrument(skip(self, principal))]
    pub async fn update_status(
        &self,
        principal: Option<&Principal>,
        order_id: String,
        target: &str,
    ) -> Result<OrderView, OrderError> {
        let principal = guard::authenticate(principal)?;
        let target: OrderStatus = target
            .parse()
            .map_err(|e: crate::domain::ParseStatusError| OrderError::ValidationError(e.to_string()))?;

        let action = OrderAction::Transition {
            requested_by: principal.clone(),
            target,
            at: Utc::now(),
            delivery_eta: self.config.delivery_eta(),
        };
        let outcome = self.apply(order_id, action).await?;

        if outcome.cancelled_now() {
            self.restore_stock(&outcome.order).await;
        }

        let view = self.view(outcome.order).await;
        self.notify(Topic::Order(view.order.id.clone()), OrderEvent::OrderUpdated, &view);
        Ok(view)
    }

    /// Hands a `ready` order to a driver, moving it to `delivering`.
    #[instrument(skip(self, principal))]
    pub async fn assign_driver(
        &self,
        principal: Option<&Principal>,
        order_id: String,
        driver_id: String,
    ) -> Result<OrderView, OrderError> {
        let principal = guard::authenticate(principal)?;
        if driver_id.trim().is_empty() {
            return Err(OrderError::ValidationError("Driver ID is required".to_string()));
        }

        let action = OrderAction::AssignDriver {
            requested_by: principal.clone(),
            driver_id: driver_id.clone(),
            at: Utc::now(),
            delivery_eta: self.config.delivery_eta(),
        };
        let outcome = self.apply(order_id, action).await?;

        let view = self.view(outcome.order).await;
        self.notify(Topic::Driver(driver_id), OrderEvent::DeliveryAssigned, &view);
        Ok(view)
    }

    #[instrument(skip(self, principal))]
    pub async fn get_stats(&self, principal: Option<&Principal>, range: StatsRange) -> Result<OrderStats, OrderError> {
        guard::require_admin(guard::authenticate(principal)?)?;
        let orders = self.inner.list().await?;
        Ok(compute_stats(&orders, &range, Utc::now()))
    }

    async fn resolve_items(&self, requested: &[OrderItemRequest]) -> Result<(String, Vec<OrderItem>), OrderError> {
        let mut vendor_id: Option<String> = None;
        let mut items = Vec::with_capacity(requested.len());

        for line in requested {
            let product = self
                .product_client
                .get_product(line.product_id.clone())
                .await?
                .ok_or_else(|| {
                    error!(product_id = %line.product_id, "Product not found");
                    OrderError::product_not_found(line.product_id.clone())
                })?;

            if !product.can_supply(line.quantity) {
                warn!(
                    product_id = %product.id,
                    requested = line.quantity,
                    available = product.stock_quantity,
                    "Product unavailable in requested quantity"
                );
                return Err(OrderError::Unavailable {
                    product_id: product.id.clone(),
                    reason: format!("Product {} is not available in the requested quantity", product.name.en),
                });
            }

            match &vendor_id {
                None => vendor_id = Some(product.vendor_id.clone()),
                Some(vendor) if *vendor != product.vendor_id => {
                    return Err(OrderError::ValidationError(format!(
                        "Product {} belongs to a different vendor; all items must come from vendor {}",
                        product.id, vendor
                    )));
                }
                Some(_) => {}
            }

            items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                price: product.price,
            });
        }

        let vendor_id =
            vendor_id.ok_or_else(|| OrderError::ValidationError("An order needs at least one item".to_string()))?;
        Ok((vendor_id, items))
    }

    async fn apply(&self, order_id: String, action: OrderAction) -> Result<TransitionOutcome, OrderError> {
        let outcome = self.inner.perform_action(order_id, action).await.map_err(|e| {
            let e = OrderError::from(e);
            warn!(error = %e, "Order action rejected");
            e
        })?;
        info!(
            order_id = %outcome.order.id,
            from = %outcome.previous,
            to = %outcome.order.status,
            "Order status updated"
        );
        Ok(outcome)
    }

    async fn restore_stock(&self, order: &Order) -> usize {
        let lines: Vec<(String, u32)> = order
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();
        self.product_client.restore_items(&lines).await
    }

    async fn fetch(&self, order_id: String) -> Result<Order, OrderError> {
        self.inner
            .get(order_id.clone())
            .await?
            .ok_or_else(|| OrderError::order_not_found(order_id))
    }

    async fn query(&self, scope: ListScope, query: &ListQuery) -> Result<Vec<OrderView>, OrderError> {
        let orders: Vec<Order> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|order| scope.includes(order))
            .collect();

        let page = query.apply(orders);
        debug!(count = page.len(), "Orders listed");

        let mut views = Vec::with_capacity(page.len());
        for order in page {
            views.push(self.view(order).await);
        }
        Ok(views)
    }

    async fn view(&self, order: Order) -> OrderView {
        let passenger = self.user_client.summary(&order.passenger_id).await;
        let vendor = self.user_client.summary(&order.vendor_id).await;
        let driver = match &order.driver_id {
            Some(id) => self.user_client.summary(id).await,
            None => None,
        };
        OrderView { order, passenger, vendor, driver }
    }

    /// Fire-and-forget: failures are logged, never returned.
    fn notify(&self, topic: Topic, event: OrderEvent, view: &OrderView) {
        let result = serde_json::to_value(view)
            .map_err(|e| PublishError::Serialization(e.to_string()))
            .and_then(|payload| self.publisher.publish(&topic, event, payload));

        match result {
            Ok(()) => debug!(%topic, %event, "Event published"),
            Err(e) => warn!(%topic, %event, error = %e, "Event publish failed"),
        }
    }
}
