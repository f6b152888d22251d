//! Marketplace listing pipeline: radius, equality filters, name prefix,
//! numeric filters, stock, then a stable sort.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::logic::geo::within_radius_km;
use crate::model::{GeoPoint, InventoryItem, MarketplaceQueryRequest};

#[derive(Debug, Error, PartialEq)]
pub enum MarketplaceError {
    #[error("No location known for pincode {0}")]
    UnknownPincode(String),

    #[error("Filter '{0}' must be a number")]
    InvalidFilter(String),

    #[error("Radius must be a positive number of kilometres")]
    InvalidRadius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Average rating, best first
    Ratings,
    /// Price, cheapest first
    Price,
    /// Quantity, smallest first
    Quantity,
}

impl SortKey {
    /// Unknown keys yield `None` and leave the order unchanged
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "ratings" | "rating" => Some(SortKey::Ratings),
            "price" => Some(SortKey::Price),
            "quantity" => Some(SortKey::Quantity),
            _ => None,
        }
    }

    fn compare(&self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        match self {
            SortKey::Ratings => b.average_rating.total_cmp(&a.average_rating),
            SortKey::Price => a.price.value.total_cmp(&b.price.value),
            SortKey::Quantity => a.quantity.value.total_cmp(&b.quantity.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<f64>,
    pub max_quantity: Option<f64>,
    pub rating_threshold: Option<f64>,
}

fn numeric(key: &str, value: &Value) -> Result<Option<f64>, MarketplaceError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| MarketplaceError::InvalidFilter(key.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| MarketplaceError::InvalidFilter(key.to_string())),
        _ => Err(MarketplaceError::InvalidFilter(key.to_string())),
    }
}

impl ListingFilters {
    /// Read the known filter keys; anything else in the map is ignored
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, MarketplaceError> {
        let mut filters = ListingFilters::default();
        for (key, value) in map {
            let slot = match key.as_str() {
                "min_price" => &mut filters.min_price,
                "max_price" => &mut filters.max_price,
                "min_quantity" => &mut filters.min_quantity,
                "max_quantity" => &mut filters.max_quantity,
                "rating_threshold" => &mut filters.rating_threshold,
                _ => continue,
            };
            *slot = numeric(key, value)?;
        }
        Ok(filters)
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        let price = item.price.value;
        let quantity = item.quantity.value;

        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
            && self.min_quantity.map_or(true, |min| quantity >= min)
            && self.max_quantity.map_or(true, |max| quantity <= max)
            && self
                .rating_threshold
                .map_or(true, |threshold| item.average_rating >= threshold)
    }
}

/// True when the request needs pincode coordinates resolved
pub fn needs_locations(request: &MarketplaceQueryRequest) -> bool {
    request.radius.is_some() && request.pincode.is_some()
}

/// Run the full pipeline over `items` (in store order).
/// `locations` maps pincodes to coordinates and is only consulted for radius queries.
pub fn run_query(
    items: Vec<InventoryItem>,
    request: &MarketplaceQueryRequest,
    locations: &HashMap<String, GeoPoint>,
) -> Result<Vec<InventoryItem>, MarketplaceError> {
    let filters = match &request.filters {
        Some(map) => ListingFilters::from_map(map)?,
        None => ListingFilters::default(),
    };

    let mut items = items;
    let mut radius_applied = false;

    if let (Some(radius), Some(pincode)) = (request.radius, request.pincode.as_deref()) {
        if !(radius > 0.0) {
            return Err(MarketplaceError::InvalidRadius);
        }
        let centre = *locations
            .get(pincode)
            .ok_or_else(|| MarketplaceError::UnknownPincode(pincode.to_string()))?;

        items.retain(|item| {
            item.pincode
                .as_deref()
                .and_then(|pin| locations.get(pin))
                .map_or(false, |point| within_radius_km(centre, *point, radius))
        });
        radius_applied = true;
    }

    if let Some(category) = request.category.as_deref() {
        items.retain(|item| item.category == category);
    }
    if let Some(farm) = request.farm.as_deref() {
        items.retain(|item| item.farm.as_deref() == Some(farm));
    }
    if !radius_applied {
        if let Some(pincode) = request.pincode.as_deref() {
            items.retain(|item| item.pincode.as_deref() == Some(pincode));
        }
    }

    let prefix = request.query.trim().to_lowercase();
    if !prefix.is_empty() {
        items.retain(|item| item.name.to_lowercase().starts_with(&prefix));
    }

    items.retain(|item| filters.matches(item) && item.is_in_stock());

    if let Some(key) = request.sorted_by.as_deref().and_then(SortKey::parse) {
        // sort_by is stable: ties keep store order
        items.sort_by(|a, b| key.compare(a, b));
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemStatus, Measure};
    use serde_json::json;

    fn listing(id: &str, name: &str, price: f64, quantity: f64, rating: f64, pincode: &str) -> InventoryItem {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "category": "vegetables",
            "quantity": {"value": quantity, "unit": "kg"},
            "price": {"value": price, "unit": "INR"},
            "average_rating": rating,
            "farm": "green-acres",
            "pincode": pincode,
        }))
        .unwrap()
    }

    fn ids(items: &[InventoryItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    fn locations() -> HashMap<String, GeoPoint> {
        HashMap::from([
            ("201301".to_string(), GeoPoint::new(28.5355, 77.3910)),
            ("110001".to_string(), GeoPoint::new(28.6315, 77.2167)),
            ("400001".to_string(), GeoPoint::new(18.9388, 72.8354)),
        ])
    }

    #[test]
    fn test_out_of_stock_items_are_hidden() {
        let mut sold_out = listing("b", "Tomato", 20.0, 0.0, 4.0, "201301");
        sold_out.item_status = ItemStatus::OutOfStock;
        let items = vec![listing("a", "Tomato", 20.0, 5.0, 4.0, "201301"), sold_out];

        let result = run_query(items, &MarketplaceQueryRequest::default(), &HashMap::new()).unwrap();
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn test_name_prefix_is_case_insensitive() {
        let items = vec![
            listing("a", "Tomato", 20.0, 5.0, 4.0, "201301"),
            listing("b", "Cherry tomato", 30.0, 5.0, 4.0, "201301"),
            listing("c", "tomatillo", 25.0, 5.0, 4.0, "201301"),
        ];
        let request = MarketplaceQueryRequest {
            query: "TOMA".to_string(),
            ..Default::default()
        };

        let result = run_query(items, &request, &HashMap::new()).unwrap();
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[test]
    fn test_radius_uses_pincode_locations() {
        let items = vec![
            listing("noida", "Rice", 40.0, 10.0, 4.0, "201301"),
            listing("delhi", "Rice", 42.0, 10.0, 4.0, "110001"),
            listing("mumbai", "Rice", 38.0, 10.0, 4.0, "400001"),
            listing("nowhere", "Rice", 38.0, 10.0, 4.0, "999999"),
        ];
        let request = MarketplaceQueryRequest {
            pincode: Some("201301".to_string()),
            radius: Some(50.0),
            ..Default::default()
        };

        let result = run_query(items, &request, &locations()).unwrap();
        assert_eq!(ids(&result), vec!["noida", "delhi"]);
    }

    #[test]
    fn test_unknown_centre_pincode() {
        let request = MarketplaceQueryRequest {
            pincode: Some("000000".to_string()),
            radius: Some(10.0),
            ..Default::default()
        };
        let err = run_query(Vec::new(), &request, &locations()).unwrap_err();
        assert_eq!(err, MarketplaceError::UnknownPincode("000000".to_string()));
    }

    #[test]
    fn test_pincode_equality_without_radius() {
        let items = vec![
            listing("a", "Rice", 40.0, 10.0, 4.0, "201301"),
            listing("b", "Rice", 40.0, 10.0, 4.0, "110001"),
        ];
        let request = MarketplaceQueryRequest {
            pincode: Some("110001".to_string()),
            ..Default::default()
        };
        let result = run_query(items, &request, &HashMap::new()).unwrap();
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn test_numeric_filters() {
        let items = vec![
            listing("cheap", "Wheat", 10.0, 100.0, 3.0, "201301"),
            listing("mid", "Wheat", 25.0, 50.0, 4.5, "201301"),
            listing("dear", "Wheat", 60.0, 5.0, 5.0, "201301"),
        ];
        let request = MarketplaceQueryRequest {
            filters: Some(
                json!({"min_price": 15, "max_price": "70", "rating_threshold": 4.0, "colour": "red"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
            ..Default::default()
        };

        let result = run_query(items, &request, &HashMap::new()).unwrap();
        assert_eq!(ids(&result), vec!["mid", "dear"]);
    }

    #[test]
    fn test_non_numeric_filter_is_rejected() {
        let request = MarketplaceQueryRequest {
            filters: Some(json!({"max_price": "cheap"}).as_object().unwrap().clone()),
            ..Default::default()
        };
        let err = run_query(Vec::new(), &request, &HashMap::new()).unwrap_err();
        assert_eq!(err, MarketplaceError::InvalidFilter("max_price".to_string()));
    }

    #[test]
    fn test_sort_orders_and_stability() {
        let items = vec![
            listing("a", "Millet", 30.0, 20.0, 4.0, "201301"),
            listing("b", "Millet", 10.0, 40.0, 5.0, "201301"),
            listing("c", "Millet", 30.0, 10.0, 4.0, "201301"),
            listing("d", "Millet", 20.0, 30.0, 3.0, "201301"),
        ];

        let by = |key: &str| {
            let request = MarketplaceQueryRequest {
                sorted_by: Some(key.to_string()),
                ..Default::default()
            };
            let sorted = run_query(items.clone(), &request, &HashMap::new()).unwrap();
            ids(&sorted).into_iter().map(str::to_string).collect::<Vec<_>>()
        };

        assert_eq!(by("ratings"), vec!["b", "a", "c", "d"]);
        assert_eq!(by("price"), vec!["b", "d", "a", "c"]);
        assert_eq!(by("quantity"), vec!["c", "a", "d", "b"]);
        assert_eq!(by("colour"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_missing_fields_sort_as_zero() {
        let mut unpriced = listing("free", "Seeds", 0.0, 1.0, 0.0, "201301");
        unpriced.price = Measure::default();
        let items = vec![listing("paid", "Seeds", 5.0, 1.0, 0.0, "201301"), unpriced];
        let request = MarketplaceQueryRequest {
            sorted_by: Some("price".to_string()),
            ..Default::default()
        };
        let result = run_query(items, &request, &HashMap::new()).unwrap();
        assert_eq!(ids(&result), vec!["free", "paid"]);
    }
}
