pub mod analytics;
pub mod geo;
pub mod marketplace;
pub mod movement;
pub mod payments;
pub mod sensors;
pub mod sync;

pub use analytics::{sales_report, system_usage, user_engagement};
pub use geo::{alert_covers, haversine_km, haversine_m, nearby_places, within_radius_km, EARTH_RADIUS_KM};
pub use marketplace::{run_query, ListingFilters, MarketplaceError, SortKey};
pub use movement::{is_delivered, movement_analytics};
pub use payments::{payment_signature, verify_payment_signature};
pub use sensors::{diagnostics, Breach};
pub use sync::resolve_conflict;
