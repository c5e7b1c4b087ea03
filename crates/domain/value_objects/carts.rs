use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::carts::CartEntity,
    value_objects::{addresses::Address, enums::payment_methods::PaymentMethod},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub medicine_id: Uuid,
    pub quantity: i32,
    /// Catalog price captured when the line was first added.
    pub price_minor: i64,
}

impl CartItem {
    pub fn line_total_minor(&self) -> i64 {
        self.price_minor.saturating_mul(i64::from(self.quantity))
    }
}

/// A user's cart. Lines can only change through the methods below, each of which
/// recomputes `total_amount_minor`, so a cart is never persisted with a stale total.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    total_amount_minor: i64,
}

impl Cart {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            total_amount_minor: 0,
        };
        cart.recompute_total();
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total_amount_minor(&self) -> i64 {
        self.total_amount_minor
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, medicine_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.medicine_id == medicine_id)
    }

    /// Adds to an existing line (keeping its price snapshot) or appends a new one.
    pub fn add(&mut self, medicine_id: Uuid, quantity: i32, price_minor: i64) {
        match self
            .items
            .iter_mut()
            .find(|item| item.medicine_id == medicine_id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                medicine_id,
                quantity,
                price_minor,
            }),
        }
        self.recompute_total();
    }

    /// Returns `false` when the medicine is not in the cart.
    pub fn set_quantity(&mut self, medicine_id: Uuid, quantity: i32) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.medicine_id == medicine_id)
        else {
            return false;
        };
        item.quantity = quantity;
        self.recompute_total();
        true
    }

    pub fn remove(&mut self, medicine_id: Uuid) {
        self.items.retain(|item| item.medicine_id != medicine_id);
        self.recompute_total();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_total();
    }

    pub fn to_entity(&self, user_id: Uuid) -> anyhow::Result<CartEntity> {
        Ok(CartEntity {
            user_id,
            items: serde_json::to_value(&self.items).context("failed to encode cart items")?,
            total_amount_minor: self.total_amount_minor,
            updated_at: Utc::now(),
        })
    }

    fn recompute_total(&mut self) {
        self.total_amount_minor = self
            .items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.line_total_minor()));
    }
}

impl TryFrom<CartEntity> for Cart {
    type Error = anyhow::Error;

    fn try_from(entity: CartEntity) -> Result<Self, Self::Error> {
        // The stored total is informational; it is always derived again from the lines.
        let items = serde_json::from_value(entity.items)
            .with_context(|| format!("cart of user {} has unreadable items", entity.user_id))?;
        Ok(Cart::from_items(items))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemModel {
    pub medicine_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemModel {
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCartModel {
    pub shipping_address: Address,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub prescription_url: Option<String>,
}
