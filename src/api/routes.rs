use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::api::{
    analytics_handlers, auth_handlers, cart_handlers, chat_handlers, forum_handlers, geo_handlers,
    group_handlers, inventory_handlers, marketplace_handlers, notification_handlers,
    order_handlers, partner_handlers, payment_handlers, sensor_handlers, service_handlers,
    sync_handlers, traceability_handlers, translate_handlers,
};
use crate::store::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Marketplace
        .route("/marketplace", get(marketplace_handlers::list_listings::<S>))
        .route(
            "/marketplace/category/:category",
            get(marketplace_handlers::listings_by_category::<S>),
        )
        .route("/marketplace/search", get(marketplace_handlers::search_listings::<S>))
        .route("/marketplace/query", post(marketplace_handlers::query_listings::<S>))
        .nest("/api", api_routes::<S>())
}

fn api_routes<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // System
        .route("/health", get(handlers::api_health))
        .route("/version", get(handlers::get_version))
        .route("/config", get(handlers::get_config::<S>))
        .route("/feature-flags", get(handlers::get_feature_flags::<S>))
        .route("/logs", post(handlers::submit_log::<S>))
        .route("/admin/logs", get(handlers::get_system_logs::<S>))
        .route("/admin/users", get(handlers::list_users::<S>))
        .route("/search", get(handlers::global_search::<S>))
        // Profile
        .route(
            "/auth/profile",
            get(auth_handlers::get_profile::<S>).put(auth_handlers::update_profile::<S>),
        )
        // Inventory
        .route("/inventory", get(inventory_handlers::list_items::<S>))
        .route("/inventory/items", post(inventory_handlers::create_item::<S>))
        .route("/inventory/search", get(inventory_handlers::search_items::<S>))
        .route("/inventory/categories", get(inventory_handlers::list_categories::<S>))
        .route("/inventory/history", get(inventory_handlers::get_history::<S>))
        .route("/inventory/analytics", get(inventory_handlers::get_analytics::<S>))
        .route(
            "/inventory/items/:item_id",
            get(inventory_handlers::get_item::<S>)
                .put(inventory_handlers::update_item::<S>)
                .delete(inventory_handlers::delete_item::<S>),
        )
        // Cart
        .route("/cart", get(cart_handlers::get_cart::<S>))
        .route("/cart/add", post(cart_handlers::add_to_cart::<S>))
        .route("/cart/empty", delete(cart_handlers::empty_cart::<S>))
        .route(
            "/cart/:item_id",
            put(cart_handlers::update_cart_item::<S>).delete(cart_handlers::remove_cart_item::<S>),
        )
        // Orders
        .route(
            "/orders",
            get(order_handlers::list_orders::<S>).post(order_handlers::create_order::<S>),
        )
        .route(
            "/orders/:order_id",
            get(order_handlers::get_order::<S>).delete(order_handlers::delete_order::<S>),
        )
        .route("/orders/:order_id/status", put(order_handlers::update_order_status::<S>))
        .route("/orders/:order_id/tracking", get(order_handlers::get_order_tracking::<S>))
        .route("/orders/:order_id/chat", get(order_handlers::get_order_chat::<S>))
        .route("/orders/:order_id/cancel", post(order_handlers::cancel_order::<S>))
        .route("/orders/:order_id/feedback", post(order_handlers::submit_feedback::<S>))
        // Payments
        .route("/payments/initiate", post(payment_handlers::initiate_payment::<S>))
        .route("/payments/status", get(payment_handlers::get_payment_status::<S>))
        .route("/payments/confirmation", post(payment_handlers::confirm_payment::<S>))
        .route("/payments/history", get(payment_handlers::get_payment_history::<S>))
        .route("/integrations/tokens", post(payment_handlers::store_integration_token::<S>))
        // Sensors
        .route("/sensors/data", post(sensor_handlers::submit_sensor_data::<S>))
        .route("/sensors/data/:sensor_id", get(sensor_handlers::get_sensor_data::<S>))
        .route("/sensors/alerts", get(sensor_handlers::get_alerts::<S>))
        .route("/sensors/alerts/acknowledge", post(sensor_handlers::acknowledge_alert::<S>))
        .route("/sensors/thresholds", post(sensor_handlers::set_thresholds::<S>))
        .route("/sensors/diagnostics", get(sensor_handlers::get_diagnostics::<S>))
        .route("/sensors/:sensor_id/config", put(sensor_handlers::update_sensor_config::<S>))
        .route("/sensors/:sensor_id/status", get(sensor_handlers::get_sensor_status::<S>))
        // Offline sync
        .route("/sync/inventory", post(sync_handlers::sync_inventory::<S>))
        .route("/sync/chat", post(sync_handlers::sync_chat::<S>))
        .route("/sync/orders", post(sync_handlers::sync_orders::<S>))
        .route("/sync/settings", post(sync_handlers::sync_settings::<S>))
        .route("/sync/conflict", post(sync_handlers::resolve_sync_conflict::<S>))
        .route("/sync/assets", post(sync_handlers::sync_assets::<S>))
        .route("/sync/status", get(sync_handlers::get_sync_status::<S>))
        // Chat
        .route(
            "/chat/conversations",
            get(chat_handlers::list_conversations::<S>).post(chat_handlers::create_conversation::<S>),
        )
        .route(
            "/chat/conversations/:conversation_id",
            get(chat_handlers::get_conversation::<S>).put(chat_handlers::update_conversation::<S>),
        )
        .route(
            "/chat/conversations/:conversation_id/metadata",
            get(chat_handlers::get_conversation_metadata::<S>),
        )
        .route(
            "/chat/conversations/:conversation_id/messages",
            get(chat_handlers::list_messages::<S>).post(chat_handlers::send_message::<S>),
        )
        .route("/chat/bot", post(chat_handlers::chatbot_query))
        // Forum
        .route("/forum/categories", get(forum_handlers::list_categories::<S>))
        .route("/forum/search", get(forum_handlers::search_threads::<S>))
        .route(
            "/forum/threads",
            get(forum_handlers::list_threads::<S>).post(forum_handlers::create_thread::<S>),
        )
        .route(
            "/forum/threads/:thread_id",
            get(forum_handlers::get_thread::<S>)
                .put(forum_handlers::update_thread::<S>)
                .delete(forum_handlers::delete_thread::<S>),
        )
        .route(
            "/forum/threads/:thread_id/comments",
            get(forum_handlers::list_comments::<S>).post(forum_handlers::add_comment::<S>),
        )
        .route("/forum/threads/:thread_id/vote", post(forum_handlers::vote_thread::<S>))
        .route("/forum/threads/:thread_id/report", post(forum_handlers::report_thread::<S>))
        .route("/forum/threads/:thread_id/moderate", put(forum_handlers::moderate_thread::<S>))
        // Groups
        .route(
            "/groups",
            get(group_handlers::list_groups::<S>).post(group_handlers::create_group::<S>),
        )
        .route(
            "/groups/:group_id",
            get(group_handlers::get_group::<S>)
                .put(group_handlers::update_group::<S>)
                .delete(group_handlers::delete_group::<S>),
        )
        .route(
            "/groups/:group_id/members",
            get(group_handlers::list_members::<S>).post(group_handlers::add_member::<S>),
        )
        .route(
            "/groups/:group_id/members/:member_id",
            delete(group_handlers::remove_member::<S>),
        )
        .route("/groups/:group_id/invite", post(group_handlers::invite_member::<S>))
        .route(
            "/groups/:group_id/chat",
            get(group_handlers::get_group_chat::<S>).post(group_handlers::post_group_message::<S>),
        )
        // Geospatial
        .route("/geospatial/maps", get(geo_handlers::get_maps::<S>))
        .route("/geospatial/search", get(geo_handlers::search_places::<S>))
        .route("/geospatial/alerts", get(geo_handlers::get_alerts::<S>))
        .route("/geospatial/alerts/subscribe", post(geo_handlers::subscribe_alerts::<S>))
        .route("/geospatial/alerts/preferences", get(geo_handlers::get_alert_preferences::<S>))
        .route("/geospatial/movement", post(geo_handlers::track_movement::<S>))
        .route("/geospatial/movement/analytics", get(geo_handlers::get_movement_analytics::<S>))
        // Notifications
        .route("/notifications", get(notification_handlers::list_notifications::<S>))
        .route("/notifications/unread-count", get(notification_handlers::unread_count::<S>))
        .route("/notifications/send", post(notification_handlers::send_notification::<S>))
        .route("/notifications/subscribe", post(notification_handlers::subscribe_topic::<S>))
        .route("/notifications/unsubscribe", post(notification_handlers::unsubscribe_topic::<S>))
        .route(
            "/notifications/:notification_id",
            delete(notification_handlers::delete_notification::<S>),
        )
        .route(
            "/notifications/:notification_id/mark-read",
            put(notification_handlers::mark_read::<S>),
        )
        // Traceability and reviews
        .route("/traceability", get(traceability_handlers::get_traceability::<S>))
        .route("/traceability/scan", post(traceability_handlers::scan_code::<S>))
        .route("/traceability/documents", post(traceability_handlers::register_document::<S>))
        .route(
            "/reviews",
            get(traceability_handlers::list_reviews::<S>).post(traceability_handlers::submit_review::<S>),
        )
        .route("/reviews/summary", get(traceability_handlers::review_summary::<S>))
        .route("/reviews/moderate", put(traceability_handlers::moderate_review::<S>))
        .route(
            "/reviews/:review_id",
            put(traceability_handlers::edit_review::<S>).delete(traceability_handlers::delete_review::<S>),
        )
        .route("/users/:user_id/reviews", get(traceability_handlers::user_reviews::<S>))
        // Translation
        .route("/translate", post(translate_handlers::translate_text::<S>))
        // Partners
        .route(
            "/partners/retail",
            get(partner_handlers::list_retail_partners::<S>).post(partner_handlers::create_retail_partner::<S>),
        )
        .route(
            "/partners/cold-storage",
            get(partner_handlers::list_cold_storage_partners::<S>)
                .post(partner_handlers::create_cold_storage_partner::<S>),
        )
        .route(
            "/partners/transport",
            get(partner_handlers::list_transport_partners::<S>)
                .post(partner_handlers::create_transport_partner::<S>),
        )
        .route("/partners/update", put(partner_handlers::update_partner::<S>))
        .route("/partners/search", get(partner_handlers::search_partners::<S>))
        .route("/partners/:partner_id/reviews", get(partner_handlers::partner_reviews::<S>))
        .route("/partners/:partner_id/analytics", get(partner_handlers::partner_analytics::<S>))
        // Cold storage service listings
        .route(
            "/cold_storage_services",
            get(service_handlers::list_services::<S>).post(service_handlers::create_service::<S>),
        )
        .route(
            "/cold_storage_services/:service_id",
            get(service_handlers::get_service::<S>)
                .put(service_handlers::update_service::<S>)
                .delete(service_handlers::delete_service::<S>),
        )
        .route(
            "/cold_storage_services/:service_id/favorite",
            patch(service_handlers::mark_favorite::<S>),
        )
        .route(
            "/cold_storage_services/:service_id/unfavorite",
            patch(service_handlers::unmark_favorite::<S>),
        )
        // Platform analytics
        .route("/analytics/users", get(analytics_handlers::get_user_engagement::<S>))
        .route("/analytics/sales", get(analytics_handlers::get_sales_report::<S>))
        .route("/analytics/system", get(analytics_handlers::get_system_usage::<S>))
}
