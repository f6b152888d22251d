use serde::{Deserialize, Serialize};

use super::common::Id;
use super::user_context::UserContext;

/// A numeric amount with its unit (`{"value": 10, "unit": "kg"}`).
/// Plain numbers are accepted on input and read as a unitless amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MeasureRepr")]
pub struct Measure {
    pub value: f64,
    pub unit: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MeasureRepr {
    Plain(f64),
    Full {
        value: f64,
        #[serde(default)]
        unit: Option<String>,
    },
}

impl From<MeasureRepr> for Measure {
    fn from(repr: MeasureRepr) -> Self {
        match repr {
            MeasureRepr::Plain(value) => Measure::new(value, ""),
            MeasureRepr::Full { value, unit } => Measure {
                value,
                unit: unit.unwrap_or_default(),
            },
        }
    }
}

impl Measure {
    pub fn new(value: f64, unit: &str) -> Self {
        Self {
            value,
            unit: unit.to_string(),
        }
    }
}

impl Default for Measure {
    fn default() -> Self {
        Self::new(0.0, "")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    #[default]
    SelfStored,
    ExternallyStored,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::SelfStored => "self_stored",
            StorageType::ExternallyStored => "externally_stored",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    #[serde(rename = "in stock")]
    InStock,
    #[serde(rename = "out of stock")]
    OutOfStock,
    #[serde(rename = "sold")]
    Sold,
}

impl ItemStatus {
    pub fn for_quantity(quantity: f64) -> Self {
        if quantity <= 0.0 {
            ItemStatus::OutOfStock
        } else {
            ItemStatus::InStock
        }
    }
}

/// A listing in the `inventory` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: Measure,
    #[serde(default)]
    pub price: Measure,
    #[serde(default)]
    pub storage: StorageType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub farm: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ratings: Vec<f64>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub item_status: ItemStatus,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl InventoryItem {
    pub fn is_in_stock(&self) -> bool {
        self.item_status == ItemStatus::InStock
    }

    /// Owners edit their own items; items without an owner are admin only
    pub fn editable_by(&self, user: &UserContext) -> bool {
        match self.owner_id.as_deref() {
            Some(owner) => user.is(owner),
            None => user.is_admin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    pub id: Option<Id>,
    pub name: String,
    pub category: String,
    pub quantity: Measure,
    pub price: Measure,
    #[serde(default)]
    pub storage: StorageType,
    pub description: Option<String>,
    pub farm: Option<String>,
    pub pincode: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl NewInventoryItem {
    pub fn into_item(self, owner_id: &str, now: &str) -> InventoryItem {
        InventoryItem {
            id: self.id.unwrap_or_default(),
            item_status: ItemStatus::for_quantity(self.quantity.value),
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            price: self.price,
            storage: self.storage,
            description: self.description,
            farm: self.farm,
            pincode: self.pincode,
            location: self.location,
            image_url: self.image_url,
            ratings: Vec::new(),
            average_rating: 0.0,
            owner_id: Some(owner_id.to_string()),
            created_at: Some(now.to_string()),
            updated_at: Some(now.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<Measure>,
    pub price: Option<Measure>,
    pub storage: Option<StorageType>,
    pub description: Option<String>,
    pub farm: Option<String>,
    pub pincode: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub item_status: Option<ItemStatus>,
}

impl InventoryItemUpdate {
    pub fn apply_to(self, item: &mut InventoryItem, now: &str) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(storage) = self.storage {
            item.storage = storage;
        }
        if let Some(description) = self.description {
            item.description = Some(description);
        }
        if let Some(farm) = self.farm {
            item.farm = Some(farm);
        }
        if let Some(pincode) = self.pincode {
            item.pincode = Some(pincode);
        }
        if let Some(location) = self.location {
            item.location = Some(location);
        }
        if let Some(image_url) = self.image_url {
            item.image_url = Some(image_url);
        }
        if let Some(status) = self.item_status {
            item.item_status = status;
        }
        if let Some(quantity) = self.quantity {
            if quantity.value <= 0.0 {
                item.item_status = ItemStatus::OutOfStock;
            } else if item.item_status == ItemStatus::OutOfStock {
                item.item_status = ItemStatus::InStock;
            }
            item.quantity = quantity;
        }
        item.updated_at = Some(now.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

/// Entry of the `inventory_history` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryHistoryEntry {
    pub item_id: Id,
    pub action: HistoryAction,
    pub storage: StorageType,
    pub user_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub snapshot: Option<InventoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_measure_accepts_plain_numbers() {
        let measure: Measure = serde_json::from_value(json!(12.5)).unwrap();
        assert_eq!(measure, Measure::new(12.5, ""));

        let measure: Measure = serde_json::from_value(json!({"value": 3, "unit": "kg"})).unwrap();
        assert_eq!(measure, Measure::new(3.0, "kg"));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(serde_json::to_value(ItemStatus::OutOfStock).unwrap(), json!("out of stock"));
        let item: InventoryItem = serde_json::from_value(json!({"name": "Rice"})).unwrap();
        assert!(item.is_in_stock());
        assert_eq!(item.storage, StorageType::SelfStored);
    }

    #[test]
    fn test_update_restocks_out_of_stock_item() {
        let mut item = NewInventoryItem {
            id: None,
            name: "Onion".to_string(),
            category: "vegetables".to_string(),
            quantity: Measure::new(0.0, "kg"),
            price: Measure::new(30.0, "INR"),
            storage: StorageType::SelfStored,
            description: None,
            farm: None,
            pincode: None,
            location: None,
            image_url: None,
        }
        .into_item("farmer-1", "2024-01-01T00:00:00Z");
        assert_eq!(item.item_status, ItemStatus::OutOfStock);

        let update = InventoryItemUpdate {
            quantity: Some(Measure::new(5.0, "kg")),
            ..Default::default()
        };
        update.apply_to(&mut item, "2024-01-02T00:00:00Z");
        assert_eq!(item.item_status, ItemStatus::InStock);
        assert_eq!(item.updated_at.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_ownerless_items_need_an_admin() {
        let mut item: InventoryItem = serde_json::from_value(json!({"name": "Wheat"})).unwrap();
        let farmer = UserContext::new("farmer-1".to_string());
        let admin = UserContext::new("ops".to_string()).with_roles(vec!["admin".to_string()]);

        assert!(!item.editable_by(&farmer));
        assert!(item.editable_by(&admin));

        item.owner_id = Some("farmer-1".to_string());
        assert!(item.editable_by(&farmer));
        assert!(!item.editable_by(&UserContext::new("farmer-2".to_string())));
    }
}
