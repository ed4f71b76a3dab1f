/// Custom actions for Product entities.
///
/// These actions represent the stock operations the order engine performs
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Reserves a specified amount of stock.
    ///
    /// # Errors
    /// Fails if the product is unavailable or the amount exceeds the stock.
    Reserve(u32),
    /// Returns previously reserved stock.
    Restore(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    Reserve(u32),
    Restore(u32),
}
