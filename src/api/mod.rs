pub mod analytics_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod chat_handlers;
pub mod forum_handlers;
pub mod geo_handlers;
pub mod group_handlers;
pub mod handlers;
pub mod inventory_handlers;
pub mod json_extractor;
pub mod marketplace_handlers;
pub mod notification_handlers;
pub mod order_handlers;
pub mod partner_handlers;
pub mod payment_handlers;
pub mod routes;
pub mod sensor_handlers;
pub mod service_handlers;
pub mod sync_handlers;
pub mod traceability_handlers;
pub mod translate_handlers;
pub mod user_extractor;

pub use handlers::{AppContext, AppState, ErrorResponse, HealthResponse, ListResponse};
pub use json_extractor::{ApiJson, ApiPath, ApiQuery};
pub use routes::*;
