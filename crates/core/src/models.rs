//! Records exchanged with the external user, product and order services.
//!
//! These are plain data carriers. JSON uses camelCase field names. The
//! services own the authoritative state; nothing here enforces
//! cross-entity consistency (stock is never decremented locally).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Clp, CommentBody, CommentId, Email, OrderId, OrderStatus, ProductId, Rating, Rut, UserId,
    UserRole,
};

// =============================================================================
// Products & Comments
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Clp,
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    /// Country or region the product comes from.
    #[serde(default)]
    pub origin: String,
    /// Image URL or path under `/static`.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl Product {
    /// Stock below which the dashboard flags a product.
    pub const LOW_STOCK_THRESHOLD: u32 = 10;

    /// `true` if the product can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// `true` if stock is below [`Self::LOW_STOCK_THRESHOLD`].
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock < Self::LOW_STOCK_THRESHOLD
    }

    /// Average rating of the attached comments, if any.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        average_rating(&self.comments)
    }
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Clp,
    pub stock: u32,
    pub description: String,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            origin: product.origin.clone(),
            image: product.image.clone(),
        }
    }
}

/// A stored product review.
///
/// Body and rating are taken as the service returns them; only
/// [`NewComment`] is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub product_id: ProductId,
    pub author: String,
    pub body: String,
    pub rating: i64,
    pub date: DateTime<Utc>,
}

impl Comment {
    /// Rating clamped to 0..=5 stars.
    #[must_use]
    pub fn stars(&self) -> u8 {
        u8::try_from(self.rating.clamp(0, i64::from(Rating::MAX))).unwrap_or_default()
    }

    /// Filled and empty stars for display, e.g. `★★★☆☆`.
    #[must_use]
    pub fn display_stars(&self) -> String {
        let filled = usize::from(self.stars());
        let empty = usize::from(Rating::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

/// Body for posting a review on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub body: CommentBody,
    pub rating: Rating,
}

/// Average star rating of a set of comments.
#[must_use]
pub fn average_rating(comments: &[Comment]) -> Option<f64> {
    if comments.is_empty() {
        return None;
    }
    let total: u32 = comments.iter().map(|c| u32::from(c.stars())).sum();
    #[allow(clippy::cast_precision_loss)] // comment counts are tiny
    Some(f64::from(total) / comments.len() as f64)
}

// =============================================================================
// Orders
// =============================================================================

/// One product line of an order, with the unit price at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Clp,
}

impl OrderLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Clp {
        self.unit_price * self.quantity
    }
}

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    pub region: String,
    pub commune: String,
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ShippingInfo {
    /// Recipient's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An order as stored by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub shipping: ShippingInfo,
    pub subtotal: Clp,
    pub shipping_cost: Clp,
    pub total: Clp,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

/// Body for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub shipping: ShippingInfo,
    pub subtotal: Clp,
    pub shipping_cost: Clp,
    pub total: Clp,
}

/// Body for changing an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Sum of order totals, excluding cancelled orders.
#[must_use]
pub fn total_revenue(orders: &[Order]) -> Clp {
    orders
        .iter()
        .filter(|order| order.status.counts_as_revenue())
        .map(|order| order.total)
        .sum()
}

// =============================================================================
// Users & Auth
// =============================================================================

/// A registered user. The password never appears here.
///
/// RUT and email are kept as stored so that one legacy record cannot fail a
/// whole listing; [`NewUser`] and [`UserUpdate`] carry the validated forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub rut: String,
    pub birth_date: NaiveDate,
    pub region: String,
    #[serde(default)]
    pub commune: String,
    pub address: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// First and last name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body for registering or creating a user. Only ever serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub rut: Rut,
    pub birth_date: NaiveDate,
    pub region: String,
    pub commune: String,
    pub address: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    pub password: String,
}

/// Body for replacing a user; password is only sent when changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub rut: Rut,
    pub birth_date: NaiveDate,
    pub region: String,
    pub commune: String,
    pub address: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Credentials posted to the user service.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: a bearer token and the user it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: Email::parse("ana@duoc.cl").unwrap(),
            phone: None,
            region: "Región Metropolitana de Santiago".to_string(),
            commune: "Ñuñoa".to_string(),
            address: "Av. Grecia 1234".to_string(),
            notes: None,
        }
    }

    fn order(id: i32, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: None,
            date: Utc::now(),
            status,
            items: vec![],
            shipping: shipping(),
            subtotal: Clp::new(total - 3000),
            shipping_cost: Clp::new(3000),
            total: Clp::new(total),
        }
    }

    #[test]
    fn test_total_revenue_excludes_cancelled() {
        let orders = vec![
            order(1, OrderStatus::Paid, 10_000),
            order(2, OrderStatus::Cancelled, 50_000),
            order(3, OrderStatus::Delivered, 5_000),
            order(4, OrderStatus::Pending, 1_000),
        ];
        assert_eq!(total_revenue(&orders), Clp::new(16_000));
        assert_eq!(total_revenue(&[]), Clp::ZERO);
    }

    #[test]
    fn test_product_deserializes_from_service_json() {
        let json = r#"{
            "id": 3,
            "name": "Manzanas Fuji",
            "category": "Frutas Frescas",
            "price": 1200,
            "stock": 150,
            "description": "Crujientes y jugosas",
            "origin": "Chile",
            "image": "/static/img/manzanas.jpg",
            "comments": [{
                "id": 1, "productId": 3, "author": "Ana", "body": "Muy ricas",
                "rating": 5, "date": "2025-03-01T12:00:00Z"
            }]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Clp::new(1200));
        assert_eq!(product.comments.len(), 1);
        assert_eq!(product.average_rating(), Some(5.0));
    }

    #[test]
    fn test_product_without_optional_fields() {
        let json = r#"{"id":1,"name":"Miel","category":"Productos Orgánicos","price":5000,"stock":3}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.image.is_none());
        assert!(product.is_low_stock());
        assert_eq!(product.average_rating(), None);
    }

    #[test]
    fn test_user_json_never_carries_password() {
        let json = r#"{
            "id": 9, "firstName": "Ana", "lastName": "Pérez", "rut": "12.345.678-5",
            "birthDate": "1990-05-01", "region": "Región de Valparaíso",
            "address": "Calle 1", "email": "ana@duoc.cl", "role": "ADMIN",
            "password": "ignored"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        let back = serde_json::to_string(&user).unwrap();
        assert!(!back.contains("password"));
    }

    #[test]
    fn test_user_list_tolerates_legacy_records() {
        let json = r#"[
            {"id": 1, "firstName": "Ana", "lastName": "Pérez", "rut": "12.345.678-5",
             "birthDate": "1990-05-01", "region": "Región de Valparaíso",
             "address": "Calle 1", "email": "ana@duoc.cl"},
            {"id": 2, "firstName": "Luis", "lastName": "Soto", "rut": "12.345.678-9",
             "birthDate": "1985-01-20", "region": "Región de Valparaíso",
             "address": "Calle 2", "email": "luis@example.com"}
        ]"#;
        let users: Vec<User> = serde_json::from_str(json).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].rut, "12.345.678-9");
        assert_eq!(users[1].email, "luis@example.com");
    }

    #[test]
    fn test_product_tolerates_long_stored_comment() {
        let body = "a".repeat(101);
        let json = format!(
            r#"{{"id":1,"name":"Miel","category":"Productos Orgánicos","price":5000,"stock":3,
                "comments":[{{"id":1,"productId":1,"author":"Ana","body":"{body}",
                "rating":9,"date":"2025-03-01T12:00:00Z"}}]}}"#
        );
        let product: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product.comments[0].body.len(), 101);
        assert_eq!(product.comments[0].display_stars(), "★★★★★");
        assert_eq!(product.average_rating(), Some(5.0));
    }

    #[test]
    fn test_user_update_omits_unchanged_password() {
        let update = UserUpdate {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            rut: Rut::parse("12345678-5").unwrap(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            region: "Región de Valparaíso".to_string(),
            commune: "Viña del Mar".to_string(),
            address: "Calle 1".to_string(),
            email: Email::parse("ana@duoc.cl").unwrap(),
            phone: None,
            role: UserRole::User,
            password: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["firstName"], "Ana");
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            product_id: ProductId::new(1),
            product_name: "Naranjas".to_string(),
            quantity: 3,
            unit_price: Clp::new(1000),
        };
        assert_eq!(line.line_total(), Clp::new(3000));
    }
}
