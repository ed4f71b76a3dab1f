use super::order::{Destination, Order, OrderStatus, PaymentMethod, PickupLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

/// What a passenger submits to place an order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub destination: Destination,
    pub pickup_location: PickupLocation,
    pub notes: Option<String>,
    pub is_urgent: bool,
    pub payment_method: PaymentMethod,
}

impl CreateOrderRequest {
    pub fn new(items: Vec<OrderItemRequest>, destination: Destination, pickup_location: PickupLocation) -> Self {
        Self {
            items,
            destination,
            pickup_location,
            notes: None,
            is_urgent: false,
            payment_method: PaymentMethod::default(),
        }
    }

    pub fn urgent(mut self) -> Self {
        self.is_urgent = true;
        self
    }

    /// Shape checks that need no catalog lookup.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("An order needs at least one item".to_string());
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(format!("Quantity for product {} must be at least 1", item.product_id));
        }
        if self.destination.address.trim().is_empty() {
            return Err("Destination address is required".to_string());
        }
        if self.pickup_location.address.trim().is_empty() {
            return Err("Pickup location address is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Status filter, creation-time ordering and page window for order listings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub sort: SortOrder,
    /// 1-based
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            sort: SortOrder::default(),
            page: 1,
            limit: 100,
        }
    }
}

impl ListQuery {
    pub fn with_status(status: OrderStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        let mut orders: Vec<Order> = orders
            .into_iter()
            .filter(|order| self.status.map_or(true, |status| order.status == status))
            .collect();

        orders.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        if self.sort == SortOrder::NewestFirst {
            orders.reverse();
        }

        // pages past the end are empty, however far past
        let skip = (self.page.max(1) - 1).saturating_mul(self.limit);
        orders.into_iter().skip(skip).take(self.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_framework::sample_order;
    use chrono::{Duration, Utc};

    #[test]
    fn test_missing_addresses_fail_validation() {
        let mut request = CreateOrderRequest::new(
            vec![OrderItemRequest::new("product_1", 1)],
            Destination::at("Ha Abia"),
            PickupLocation::at(" "),
        );
        assert_eq!(request.validate(), Err("Pickup location address is required".to_string()));

        request.pickup_location = PickupLocation::at("Pioneer Mall");
        assert_eq!(request.validate(), Ok(()));

        request.items.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_query_filters_sorts_and_pages() {
        let now = Utc::now();
        let orders: Vec<Order> = (1..=5)
            .map(|n| {
                let mut order = sample_order(&format!("order_{}", n), "p1", "v1");
                order.created_at = now + Duration::minutes(n);
                if n % 2 == 0 {
                    order.status = OrderStatus::Cancelled;
                }
                order
            })
            .collect();

        let newest = ListQuery { limit: 2, ..ListQuery::default() }.apply(orders.clone());
        let ids: Vec<&str> = newest.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["order_5", "order_4"]);

        let second_page = ListQuery { limit: 2, page: 2, sort: SortOrder::OldestFirst, status: None }
            .apply(orders.clone());
        let ids: Vec<&str> = second_page.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["order_3", "order_4"]);

        let cancelled = ListQuery::with_status(OrderStatus::Cancelled).apply(orders);
        assert_eq!(cancelled.len(), 2);
    }

    #[test]
    fn test_page_far_past_the_end_is_empty() {
        let orders = vec![sample_order("order_1", "p1", "v1"), sample_order("order_2", "p1", "v1")];

        let huge = ListQuery { page: usize::MAX, limit: 2, ..ListQuery::default() };
        assert!(huge.apply(orders.clone()).is_empty());

        let wide = ListQuery { page: 3, limit: usize::MAX, ..ListQuery::default() };
        assert!(wide.apply(orders.clone()).is_empty());

        let first = ListQuery { page: 0, limit: usize::MAX, ..ListQuery::default() };
        assert_eq!(first.apply(orders).len(), 2);
    }
}
