use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gemstone listing as the backend returns it.
///
/// Field aliases absorb the backend's Mongo-style `_id` and the odd
/// camelCase/snake_case mix so the rest of the crate sees one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gem {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default, alias = "discountType")]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default, alias = "birthMonth")]
    pub birth_month: Option<String>,
    #[serde(default, alias = "zodiacSign")]
    pub zodiac_sign: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
}

/// One page of a gem listing.
#[derive(Debug, Clone, Default)]
pub struct GemPage {
    pub gems: Vec<Gem>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Product detail, optionally with related products.
#[derive(Debug, Clone)]
pub struct GemDetail {
    pub gem: Gem,
    pub related: Vec<Gem>,
}

/// Query parameters for `GET /gems`.
#[derive(Debug, Clone, Default)]
pub struct GemQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
    pub birth_month: Option<String>,
}

impl GemQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(ref search) = self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if !self.categories.is_empty() {
            query.push(("category".to_string(), self.categories.join(",")));
        }
        if let Some(min) = self.min_price {
            query.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            query.push(("maxPrice".to_string(), max.to_string()));
        }
        if let Some(ref sort) = self.sort {
            query.push(("sort".to_string(), sort.clone()));
        }
        if let Some(ref month) = self.birth_month {
            query.push(("birthMonth".to_string(), month.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default, alias = "totalAmount")]
    pub total: f64,
    #[serde(default, alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(alias = "productId", alias = "product")]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Shipping address collected at checkout. Serialized camelCase to match
/// the backend's field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub country: String,
}

/// Wire payload for `POST /orders` and `POST /payments/create-order`.
/// Every monetary value in here is already rounded to two decimals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total: f64,
}

/// Fields accepted when creating or updating a gem listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GemInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: f64,
    pub discount_type: DiscountType,
    pub category: Vec<String>,
    pub birth_month: Option<String>,
    pub zodiac_sign: Option<String>,
    pub stock: u32,
    pub image: Option<String>,
}

/// Result of `POST /orders`.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub success: bool,
    pub order_id: Option<String>,
    pub message: Option<String>,
}

/// Result of `POST /payments/create-order`: our order plus the gateway-side
/// reservation needed to open the payment widget.
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub order_id: String,
    pub gateway: Option<GatewayOrder>,
    pub gateway_key: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    #[serde(alias = "_id")]
    pub id: String,
    /// Amount in minor units (paise, cents).
    pub amount: u64,
    pub currency: String,
}

/// Result of `POST /payments/verify-payment`.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, alias = "userName")]
    pub user_name: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "gem", alias = "gemId")]
    pub gem_id: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminStats {
    #[serde(default, alias = "totalBuyers")]
    pub buyers: u64,
    #[serde(default, alias = "totalSellers")]
    pub sellers: u64,
    #[serde(default, alias = "totalProducts")]
    pub products: u64,
    #[serde(default, alias = "totalOrders")]
    pub orders: u64,
    #[serde(default, alias = "totalRevenue")]
    pub revenue: f64,
}
