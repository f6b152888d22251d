use crate::model::{GeoPoint, LocationAlert, NearbyPlace, Place};

/// Mean Earth radius (IUGG) in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometres (haversine formula)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_km(a, b) * 1000.0
}

pub fn within_radius_km(centre: GeoPoint, point: GeoPoint, radius_km: f64) -> bool {
    haversine_km(centre, point) <= radius_km
}

/// Places of `place_type` within `radius_m` metres of `centre`, nearest first
pub fn nearby_places(places: Vec<Place>, centre: GeoPoint, place_type: &str, radius_m: f64) -> Vec<NearbyPlace> {
    let mut nearby: Vec<NearbyPlace> = places
        .into_iter()
        .filter(|place| place.place_type == place_type)
        .map(|place| NearbyPlace {
            distance_m: haversine_m(centre, place.point()),
            place,
        })
        .filter(|nearby| nearby.distance_m <= radius_m)
        .collect();
    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby
}

/// Whether `point` lies inside the alert's area. Alerts without a complete
/// area apply everywhere.
pub fn alert_covers(alert: &LocationAlert, point: GeoPoint) -> bool {
    match (alert.latitude, alert.longitude, alert.radius) {
        (Some(lat), Some(lon), Some(radius_m)) => haversine_m(GeoPoint::new(lat, lon), point) <= radius_m,
        _ => true,
    }
}
