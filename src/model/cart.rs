use serde::{Deserialize, Serialize};

use super::common::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: Id,
    pub quantity: u32,
    #[serde(default)]
    pub farm_id: String,
}

/// Document `carts/{uid}`; every line comes from the same farm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAddError {
    OtherFarm,
}

impl Cart {
    pub fn farm_id(&self) -> Option<&str> {
        self.items.first().map(|line| line.farm_id.as_str())
    }

    /// Add `quantity` of an item, merging with an existing line for the same item
    pub fn add(&mut self, item_id: &str, quantity: u32, farm_id: &str) -> Result<(), CartAddError> {
        if let Some(current_farm) = self.farm_id() {
            if current_farm != farm_id {
                return Err(CartAddError::OtherFarm);
            }
        }

        match self.items.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartLine {
                item_id: item_id.to_string(),
                quantity,
                farm_id: farm_id.to_string(),
            }),
        }
        Ok(())
    }

    /// Returns false when the item is not in the cart
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> bool {
        match self.items.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.item_id != item_id);
        self.items.len() != before
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: Id,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartQuantity {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_bill: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_farm_rule() {
        let mut cart = Cart::default();
        cart.add("tomato", 2, "green-acres").unwrap();
        assert_eq!(cart.add("wheat", 1, "sunny-fields"), Err(CartAddError::OtherFarm));
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_re_adding_merges_quantity() {
        let mut cart = Cart::default();
        cart.add("tomato", 2, "green-acres").unwrap();
        cart.add("tomato", 3, "green-acres").unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn test_emptied_cart_accepts_another_farm() {
        let mut cart = Cart::default();
        cart.add("tomato", 1, "green-acres").unwrap();
        assert!(cart.remove("tomato"));
        assert!(!cart.remove("tomato"));
        assert!(cart.add("wheat", 1, "sunny-fields").is_ok());
    }
}
