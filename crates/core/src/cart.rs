//! Shopping cart kept in the visitor's session.
//!
//! The whole cart is serialized as one JSON blob under
//! [`Cart::SESSION_KEY`]. It snapshots product name and price at the time of
//! adding; the product service is not consulted again until checkout.

use serde::{Deserialize, Serialize};

use crate::models::{OrderLine, Product};
use crate::types::{Clp, ProductId};

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product has no stock.
    #[error("{0} no tiene stock disponible")]
    OutOfStock(String),
}

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Clp,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Clp {
        self.price * self.quantity
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Session key the cart is stored under.
    pub const SESSION_KEY: &'static str = "huerto_cart";

    /// Largest quantity a single line can hold.
    pub const MAX_QUANTITY: u32 = 99;

    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// Quantities are clamped to `1..=MAX_QUANTITY` per line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] if the product has no stock.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        let quantity = clamp_quantity(quantity);
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            item.quantity = clamp_quantity(item.quantity.saturating_add(quantity));
            return Ok(());
        }

        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        });
        Ok(())
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn update(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => {
                item.quantity = clamp_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if it was not there.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines as order lines, for placing an order.
    #[must_use]
    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                product_name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.price,
            })
            .collect()
    }
}

const fn clamp_quantity(quantity: u32) -> u32 {
    if quantity == 0 {
        1
    } else if quantity > Cart::MAX_QUANTITY {
        Cart::MAX_QUANTITY
    } else {
        quantity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i32, name: &str, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Frutas Frescas".to_string(),
            price: Clp::new(price),
            stock,
            description: String::new(),
            origin: "Chile".to_string(),
            image: None,
            comments: vec![],
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let apples = product(1, "Manzanas Fuji", 1200, 50);
        cart.add(&apples, 2).unwrap();
        cart.add(&apples, 3).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_add_clamps_quantity() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Miel", 5000, 500), 0).unwrap();
        assert_eq!(cart.item_count(), 1);
        cart.add(&product(1, "Miel", 5000, 500), 1000).unwrap();
        assert_eq!(cart.item_count(), Cart::MAX_QUANTITY);
    }

    #[test]
    fn test_add_rejects_out_of_stock() {
        let mut cart = Cart::new();
        let err = cart.add(&product(2, "Quinoa", 3000, 0), 1).unwrap_err();
        assert_eq!(err, CartError::OutOfStock("Quinoa".to_string()));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 1).unwrap();
        cart.add(&product(2, "Naranjas", 1000, 50), 1).unwrap();

        assert!(cart.update(ProductId::new(1), 4));
        assert_eq!(cart.item_count(), 5);

        assert!(cart.update(ProductId::new(2), 0));
        assert_eq!(cart.items().len(), 1);

        assert!(!cart.update(ProductId::new(9), 1));
        assert!(!cart.remove(ProductId::new(9)));
        assert!(cart.remove(ProductId::new(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_session_blob_round_trips() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 2).unwrap();
        let blob = serde_json::to_string(&cart).unwrap();
        assert!(blob.contains("\"productId\":1"));
        let back: Cart = serde_json::from_str(&blob).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_to_order_lines_snapshots_price() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 2).unwrap();
        let lines = cart.to_order_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_price, Clp::new(1200));
        assert_eq!(lines[0].line_total(), Clp::new(2400));
    }
}
