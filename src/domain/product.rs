use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "LSL";

/// Product or order-line name in English and Sesotho.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub st: String,
}

impl LocalizedName {
    pub fn new(en: impl Into<String>, st: impl Into<String>) -> Self {
        Self { en: en.into(), st: st.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Drinks,
    Clothing,
    Electronics,
    Household,
    Other,
}

/// Represents a product in a vendor's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub vendor_id: String,
    pub name: LocalizedName,
    pub category: Category,
    pub price: Decimal,
    pub currency: String,
    pub available: bool,
    pub stock_quantity: u32,
}

/// Payload for listing a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub vendor_id: String,
    pub name: LocalizedName,
    pub category: Category,
    pub price: Decimal,
    pub stock_quantity: u32,
}

/// Payload for updating an existing product.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub price: Option<Decimal>,
    pub available: Option<bool>,
    pub stock_quantity: Option<u32>,
}

impl ProductCreate {
    pub fn new(
        vendor_id: impl Into<String>,
        name: LocalizedName,
        category: Category,
        price: Decimal,
        stock_quantity: u32,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            name,
            category,
            price,
            stock_quantity,
        }
    }
}

impl Product {
    /// True when `quantity` units could be reserved right now.
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.available && self.stock_quantity >= quantity
    }

    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}
