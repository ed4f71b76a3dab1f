use rust_decimal::Decimal;

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, DEFAULT_CURRENCY};
use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// New products start available, priced in the default currency.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        if params.price < Decimal::ZERO {
            return Err(ProductError::ValidationError("Price cannot be negative".to_string()));
        }
        if params.name.en.trim().is_empty() || params.name.st.trim().is_empty() {
            return Err(ProductError::ValidationError(
                "Product name is required in English and Sesotho".to_string(),
            ));
        }
        Ok(Self {
            id,
            vendor_id: params.vendor_id,
            name: params.name,
            category: params.category,
            price: params.price,
            currency: DEFAULT_CURRENCY.to_string(),
            available: true,
            stock_quantity: params.stock_quantity,
        })
    }

    /// Updates the product's price, availability and/or stock.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(price) = patch.price {
            if price < Decimal::ZERO {
                return Err(ProductError::ValidationError("Price cannot be negative".to_string()));
            }
            self.price = price;
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
        if let Some(quantity) = patch.stock_quantity {
            self.stock_quantity = quantity;
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `Reserve(amount)`: Decrements stock, guarded by availability and stock level
    /// - `Restore(amount)`: Increments stock
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock_quantity)),
            ProductAction::Reserve(0) | ProductAction::Restore(0) => Err(ProductError::InvalidQuantity(0)),
            ProductAction::Reserve(amount) => {
                if !self.can_supply(amount) {
                    return Err(ProductError::Unavailable {
                        product_id: self.id.clone(),
                        name: self.name.en.clone(),
                        requested: amount,
                        available: if self.available { self.stock_quantity } else { 0 },
                    });
                }
                self.stock_quantity -= amount;
                Ok(ProductActionResult::Reserve(self.stock_quantity))
            }
            ProductAction::Restore(amount) => {
                self.stock_quantity = self.stock_quantity.saturating_add(amount);
                Ok(ProductActionResult::Restore(self.stock_quantity))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, LocalizedName};

    fn maize_meal(stock: u32) -> Product {
        Product::from_create_params(
            "product_1".into(),
            ProductCreate::new(
                "user_1",
                LocalizedName::new("Maize meal", "Phofo"),
                Category::Food,
                Decimal::from(10),
                stock,
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_reserve_exact_stock_leaves_zero() {
        let mut product = maize_meal(3);
        let result = product.handle_action(ProductAction::Reserve(3)).unwrap();
        assert_eq!(result, ProductActionResult::Reserve(0));
        assert!(!product.in_stock());
    }

    #[test]
    fn test_reserve_beyond_stock_is_rejected_without_mutation() {
        let mut product = maize_meal(3);
        let err = product.handle_action(ProductAction::Reserve(4)).unwrap_err();
        assert!(matches!(err, ProductError::Unavailable { requested: 4, available: 3, .. }));
        assert_eq!(product.stock_quantity, 3);
    }

    #[test]
    fn test_unavailable_product_cannot_be_reserved() {
        let mut product = maize_meal(10);
        product
            .on_update(ProductPatch { available: Some(false), ..Default::default() })
            .unwrap();
        assert!(product.handle_action(ProductAction::Reserve(1)).is_err());
        assert_eq!(product.stock_quantity, 10);
    }

    #[test]
    fn test_restore_adds_back() {
        let mut product = maize_meal(1);
        product.handle_action(ProductAction::Reserve(1)).unwrap();
        let result = product.handle_action(ProductAction::Restore(5)).unwrap();
        assert_eq!(result, ProductActionResult::Restore(5));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut product = maize_meal(1);
        let err = product
            .on_update(ProductPatch { price: Some(Decimal::from(-1)), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ProductError::ValidationError(_)));
        assert_eq!(product.price, Decimal::from(10));
    }
}
