use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{decode_all, message, to_document, AppState, ListResponse, MessageResponse};
use crate::api::json_extractor::{ApiJson, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::logic::{alert_covers, is_delivered, movement_analytics, nearby_places};
use crate::model::{
    now_rfc3339, GeoAlertParams, GeoPoint, GeoSearchParams, LocationAlert,
    LocationAlertSubscription, MovementAnalytics, MovementTracking, NearbyPlace, Place,
    UserContext, DEFAULT_SEARCH_RADIUS_M, VALID_PLACE_TYPES,
};
use crate::store::{collection, Store};

pub async fn get_maps<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<ListResponse<Place>>> {
    let documents = ctx.store.list(&collection("geospatial_data")).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "place_id"))))
}

pub async fn search_places<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(params): ApiQuery<GeoSearchParams>,
) -> ApiResult<Json<ListResponse<NearbyPlace>>> {
    if !VALID_PLACE_TYPES.contains(&params.place_type.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Invalid place type. Valid types are: {}",
            VALID_PLACE_TYPES.join(", ")
        )));
    }
    let radius_m = params.radius_m.unwrap_or(DEFAULT_SEARCH_RADIUS_M);
    if !(radius_m > 0.0) {
        return Err(ApiError::bad_request("radius_m must be positive"));
    }

    let places: Vec<Place> = decode_all(ctx.store.list(&collection("geospatial_data")).await?, "place_id");
    let centre = GeoPoint::new(params.latitude, params.longitude);
    let results = nearby_places(places, centre, &params.place_type, radius_m);
    Ok(Json(ListResponse::new(results)))
}

pub async fn get_alerts<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiQuery(params): ApiQuery<GeoAlertParams>,
) -> ApiResult<Json<ListResponse<LocationAlert>>> {
    let documents = ctx
        .store
        .find_by_field(&collection("location_alerts"), "user_id", &json!(user.user_id))
        .await?;
    let mut alerts: Vec<LocationAlert> = decode_all(documents, "alert_id");

    if let (Some(lat), Some(lon)) = (params.latitude, params.longitude) {
        let point = GeoPoint::new(lat, lon);
        alerts.retain(|alert| alert_covers(alert, point));
    }
    Ok(Json(ListResponse::new(alerts)))
}

pub async fn subscribe_alerts<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(subscription): ApiJson<LocationAlertSubscription>,
) -> ApiResult<Json<MessageResponse>> {
    if !(-90.0..=90.0).contains(&subscription.latitude) || !(-180.0..=180.0).contains(&subscription.longitude) {
        return Err(ApiError::bad_request("Coordinates are out of range"));
    }
    ctx.store
        .set(&collection("user_alerts").doc(&user.user_id), to_document(&subscription)?)
        .await?;
    Ok(message("Subscribed to location-based alerts."))
}

pub async fn get_alert_preferences<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    let preferences = ctx
        .store
        .get(&collection("user_alerts").doc(&user.user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("No alert preferences found."))?;
    Ok(Json(json!({ "preferences": preferences })))
}

pub async fn track_movement<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(mut movement): ApiJson<MovementTracking>,
) -> ApiResult<(StatusCode, Json<MovementTracking>)> {
    movement.user_id = Some(user.user_id.clone());
    if is_delivered(&movement) && movement.delivered_at.is_none() {
        movement.delivered_at = Some(now_rfc3339());
    }
    ctx.store
        .set(&collection("goods_movement").doc(&movement.product_id), to_document(&movement)?)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn get_movement_analytics<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<MovementAnalytics>> {
    let movements: Vec<MovementTracking> =
        decode_all(ctx.store.list(&collection("goods_movement")).await?, "product_id");
    Ok(Json(movement_analytics(&movements)))
}
