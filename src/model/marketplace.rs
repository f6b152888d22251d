use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::inventory::InventoryItem;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceQueryRequest {
    #[serde(default)]
    pub query: String,
    pub category: Option<String>,
    pub farm: Option<String>,
    pub pincode: Option<String>,
    /// `ratings`, `price` or `quantity`
    pub sorted_by: Option<String>,
    /// Search radius in kilometres around `pincode`
    pub radius: Option<f64>,
    pub filters: Option<Map<String, Value>>,
}

/// Query-string form of [`MarketplaceQueryRequest`] used by `GET /marketplace/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplaceSearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub farm: Option<String>,
    pub pincode: Option<String>,
    pub sorted_by: Option<String>,
    pub radius: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<f64>,
    pub max_quantity: Option<f64>,
    pub rating_threshold: Option<f64>,
}

impl From<MarketplaceSearchParams> for MarketplaceQueryRequest {
    fn from(params: MarketplaceSearchParams) -> Self {
        let mut filters = Map::new();
        let numeric = [
            ("min_price", params.min_price),
            ("max_price", params.max_price),
            ("min_quantity", params.min_quantity),
            ("max_quantity", params.max_quantity),
            ("rating_threshold", params.rating_threshold),
        ];
        for (key, value) in numeric {
            if let Some(value) = value {
                filters.insert(key.to_string(), Value::from(value));
            }
        }

        Self {
            query: params.query.unwrap_or_default(),
            category: params.category,
            farm: params.farm,
            pincode: params.pincode,
            sorted_by: params.sorted_by,
            radius: params.radius,
            filters: (!filters.is_empty()).then_some(filters),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceResponse {
    pub items: Vec<InventoryItem>,
    pub total: usize,
}

impl MarketplaceResponse {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}
