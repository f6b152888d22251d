use serde::{Deserialize, Serialize};

use super::common::Id;

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

pub const VALID_PLACE_TYPES: [&str; 5] = ["farm", "cold_storage", "transport", "restaurant", "hospital"];

pub const DEFAULT_SEARCH_RADIUS_M: f64 = 5000.0;

/// Document in `geospatial_data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub place_id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub place_type: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Place {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyPlace {
    #[serde(flatten)]
    pub place: Place,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoSearchParams {
    pub latitude: f64,
    pub longitude: f64,
    pub place_type: String,
    pub radius_m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoAlertParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Document in `location_alerts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAlert {
    #[serde(default)]
    pub alert_id: Id,
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Radius of the alert area in metres
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Body of `POST /api/geospatial/alerts/subscribe`, stored as `user_alerts/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAlertSubscription {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres
    pub radius: u32,
    /// Weather, Market, ...
    pub alert_type: String,
}

/// Body of `POST /api/geospatial/movement`, stored as `goods_movement/{product_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementTracking {
    pub product_id: Id,
    pub origin: String,
    pub destination: String,
    /// ISO 8601 dispatch time
    pub timestamp: String,
    /// `in transit`, `delivered`, ...
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementAnalytics {
    /// Hours between dispatch and delivery, averaged over deliveries with both timestamps
    pub average_delivery_time: f64,
    pub total_deliveries: usize,
}
