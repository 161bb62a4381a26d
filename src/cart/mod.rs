//! Client-side cart. Nothing here is persisted server-side until checkout.

use serde::{Deserialize, Serialize};

use crate::api::types::{DiscountType, Gem, OrderLine};

/// Round to two decimal places, the canonical form for every monetary value
/// sent to the backend.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub discount: f64,
    pub discount_type: DiscountType,
    pub quantity: u32,
    pub available_stock: u32,
    pub image_ref: Option<String>,
}

impl CartItem {
    pub fn from_gem(gem: &Gem, quantity: u32) -> Self {
        Self {
            product_id: gem.id.clone(),
            name: gem.name.clone(),
            unit_price: gem.price,
            discount: gem.discount,
            discount_type: gem.discount_type,
            quantity: quantity.clamp(1, gem.stock.max(1)),
            available_stock: gem.stock,
            image_ref: gem.image.clone(),
        }
    }

    /// Unit price after discount, never negative. Not yet rounded; rounding
    /// happens once, when the order payload is built.
    pub fn effective_unit_price(&self) -> f64 {
        let discounted = match self.discount_type {
            DiscountType::Percentage => self.unit_price - self.unit_price * self.discount / 100.0,
            DiscountType::Fixed => self.unit_price - self.discount,
        };
        discounted.max(0.0)
    }

    pub fn line_total(&self) -> f64 {
        self.effective_unit_price() * self.quantity as f64
    }

    /// Snapshot for the order payload, with the price rounded.
    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: round2(self.effective_unit_price()),
            quantity: self.quantity,
            image: self.image_ref.clone(),
        }
    }
}

/// In-memory cart, mutated only through these methods. During an active
/// checkout submission the flow owns it exclusively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add an item, merging quantities when the product is already present.
    /// Quantity is clamped to the available stock.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            let merged = existing.quantity.saturating_add(item.quantity);
            existing.quantity = merged.clamp(1, existing.available_stock.max(1));
        } else {
            self.items.push(item);
        }
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity.clamp(1, item.available_stock.max(1));
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Cart total, rounded.
    pub fn total(&self) -> f64 {
        round2(self.items.iter().map(CartItem::line_total).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(discount: f64, discount_type: DiscountType) -> CartItem {
        CartItem {
            product_id: "g1".to_string(),
            name: "Ruby".to_string(),
            unit_price: 1000.0,
            discount,
            discount_type,
            quantity: 1,
            available_stock: 10,
            image_ref: None,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let item = item(10.0, DiscountType::Percentage);
        assert_eq!(item.effective_unit_price(), 900.0);
    }

    #[test]
    fn test_fixed_discount() {
        let item = item(100.0, DiscountType::Fixed);
        assert_eq!(item.effective_unit_price(), 900.0);
    }

    #[test]
    fn test_zero_discount_keeps_unit_price() {
        let item = item(0.0, DiscountType::Percentage);
        assert_eq!(item.effective_unit_price(), 1000.0);
        let item = item_with_price(1000.0, 0.0, DiscountType::Fixed);
        assert_eq!(item.effective_unit_price(), 1000.0);
    }

    #[test]
    fn test_discount_never_goes_negative() {
        let item = item(1500.0, DiscountType::Fixed);
        assert_eq!(item.effective_unit_price(), 0.0);
    }

    #[test]
    fn test_order_line_price_is_rounded() {
        let mut item = item(0.0, DiscountType::Percentage);
        item.unit_price = 33.333333;
        item.quantity = 3;
        assert_eq!(item.to_order_line().price, 33.33);
    }

    #[test]
    fn test_add_merges_and_clamps_to_stock() {
        let mut cart = Cart::new();
        let mut first = item(0.0, DiscountType::Percentage);
        first.quantity = 7;
        cart.add(first);
        let mut second = item(0.0, DiscountType::Percentage);
        second.quantity = 6;
        cart.add(second);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 10);
    }

    #[test]
    fn test_total_rounds_once() {
        let mut cart = Cart::new();
        let mut a = item(0.0, DiscountType::Percentage);
        a.unit_price = 0.1;
        a.quantity = 3;
        cart.add(a);
        assert_eq!(cart.total(), 0.3);
    }

    fn item_with_price(price: f64, discount: f64, discount_type: DiscountType) -> CartItem {
        let mut item = item(discount, discount_type);
        item.unit_price = price;
        item
    }
}
