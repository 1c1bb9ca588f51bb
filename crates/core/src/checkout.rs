//! Checkout arithmetic.
//!
//! Prices are IVA-inclusive, so the tax is carved out of the subtotal
//! rather than added on top:
//!
//! - subtotal = Σ(unit price × quantity)
//! - shipping = [`SHIPPING_FEE`] for a non-empty cart, else 0
//! - IVA = round(subtotal × 0.19), net = subtotal − IVA
//! - total = subtotal + shipping

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::Cart;
use crate::models::{NewOrder, Order, OrderLine, ShippingInfo};
use crate::types::{Clp, OrderStatus, UserId};

/// Flat delivery fee for any non-empty order.
pub const SHIPPING_FEE: Clp = Clp::new(3000);

/// Chilean IVA rate (19%).
pub const IVA_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);

/// Amounts shown on the cart, checkout and receipt pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Clp,
    pub net: Clp,
    pub iva: Clp,
    pub shipping: Clp,
    pub total: Clp,
}

impl CheckoutSummary {
    /// Summary for a set of order lines.
    #[must_use]
    pub fn from_lines(lines: &[OrderLine]) -> Self {
        let subtotal: Clp = lines.iter().map(OrderLine::line_total).sum();
        let shipping = if lines.is_empty() {
            Clp::ZERO
        } else {
            SHIPPING_FEE
        };
        Self::with_shipping(subtotal, shipping)
    }

    /// Summary for the current cart.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let subtotal: Clp = cart.items().iter().map(|item| item.line_total()).sum();
        let shipping = if cart.is_empty() {
            Clp::ZERO
        } else {
            SHIPPING_FEE
        };
        Self::with_shipping(subtotal, shipping)
    }

    /// Summary for a stored order, trusting the amounts the service recorded.
    #[must_use]
    pub fn for_order(order: &Order) -> Self {
        let iva = order.subtotal.percent(IVA_RATE);
        Self {
            subtotal: order.subtotal,
            net: order.subtotal - iva,
            iva,
            shipping: order.shipping_cost,
            total: order.total,
        }
    }

    fn with_shipping(subtotal: Clp, shipping: Clp) -> Self {
        let iva = subtotal.percent(IVA_RATE);
        Self {
            subtotal,
            net: subtotal - iva,
            iva,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// Build the order body for the current cart.
///
/// Returns `None` for an empty cart; there is nothing to place.
#[must_use]
pub fn build_order(cart: &Cart, shipping: ShippingInfo, user_id: Option<UserId>) -> Option<NewOrder> {
    if cart.is_empty() {
        return None;
    }
    let items = cart.to_order_lines();
    let summary = CheckoutSummary::from_lines(&items);
    Some(NewOrder {
        user_id,
        status: OrderStatus::Pending,
        items,
        shipping,
        subtotal: summary.subtotal,
        shipping_cost: summary.shipping,
        total: summary.total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::types::Email;

    fn shipping_info() -> ShippingInfo {
        ShippingInfo {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: Email::parse("ana@duoc.cl").unwrap(),
            phone: Some("+56912345678".to_string()),
            region: "Región del Biobío".to_string(),
            commune: "Concepción".to_string(),
            address: "O'Higgins 100".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_iva_rate_is_nineteen_percent() {
        assert_eq!(IVA_RATE, Decimal::new(19, 2));
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let summary = CheckoutSummary::from_cart(&Cart::new());
        assert_eq!(summary, CheckoutSummary::default());
    }

    #[test]
    fn test_summary_for_cart() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 3).unwrap(); // 3600
        cart.add(&product(2, "Miel", 5000, 10), 1).unwrap(); // 5000

        let summary = CheckoutSummary::from_cart(&cart);
        assert_eq!(summary.subtotal, Clp::new(8600));
        assert_eq!(summary.iva, Clp::new(1634)); // 8600 * 0.19
        assert_eq!(summary.net, Clp::new(6966));
        assert_eq!(summary.shipping, SHIPPING_FEE);
        assert_eq!(summary.total, Clp::new(11_600));
    }

    #[test]
    fn test_iva_rounds_to_nearest_peso() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Zanahorias", 150, 50), 1).unwrap(); // 28.5
        let summary = CheckoutSummary::from_cart(&cart);
        assert_eq!(summary.iva, Clp::new(29));
        assert_eq!(summary.net, Clp::new(121));
    }

    #[test]
    fn test_from_lines_matches_from_cart() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 2).unwrap();
        assert_eq!(
            CheckoutSummary::from_lines(&cart.to_order_lines()),
            CheckoutSummary::from_cart(&cart)
        );
    }

    #[test]
    fn test_build_order() {
        assert!(build_order(&Cart::new(), shipping_info(), None).is_none());

        let mut cart = Cart::new();
        cart.add(&product(1, "Manzanas", 1200, 50), 2).unwrap();
        let order = build_order(&cart, shipping_info(), Some(UserId::new(4))).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, Clp::new(2400));
        assert_eq!(order.shipping_cost, SHIPPING_FEE);
        assert_eq!(order.total, Clp::new(5400));
        assert_eq!(order.user_id, Some(UserId::new(4)));
    }
}
