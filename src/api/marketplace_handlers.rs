use axum::{
    extract::State,
    response::Json,
};
use std::collections::HashMap;

use crate::api::handlers::{decode_all, AppState};
use crate::api::json_extractor::{ApiJson, ApiPath, ApiQuery};
use crate::error::ApiResult;
use crate::logic::marketplace::needs_locations;
use crate::logic::run_query;
use crate::model::{
    GeoPoint, InventoryItem, MarketplaceQueryRequest, MarketplaceResponse, MarketplaceSearchParams,
};
use crate::store::{collection, Store};

/// Pincode → coordinates from the `locations` collection
async fn load_locations<S: Store>(store: &S) -> ApiResult<HashMap<String, GeoPoint>> {
    let documents = store.list(&collection("locations")).await?;
    Ok(documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<GeoPoint>(doc.data) {
            Ok(point) => Some((doc.id, point)),
            Err(e) => {
                log::warn!("Ignoring location {} without coordinates: {}", doc.id, e);
                None
            }
        })
        .collect())
}

async fn execute<S: Store>(store: &S, request: MarketplaceQueryRequest) -> ApiResult<MarketplaceResponse> {
    let items: Vec<InventoryItem> = decode_all(store.list(&collection("inventory")).await?, "id");
    let locations = if needs_locations(&request) {
        load_locations(store).await?
    } else {
        HashMap::new()
    };

    let items = run_query(items, &request, &locations)?;
    log::debug!("Marketplace query {:?} matched {} listings", request.query, items.len());
    Ok(MarketplaceResponse::new(items))
}

pub async fn list_listings<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<MarketplaceResponse>> {
    let response = execute(ctx.store.as_ref(), MarketplaceQueryRequest::default()).await?;
    Ok(Json(response))
}

pub async fn listings_by_category<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(category): ApiPath<String>,
) -> ApiResult<Json<MarketplaceResponse>> {
    let request = MarketplaceQueryRequest {
        category: Some(category),
        ..Default::default()
    };
    Ok(Json(execute(ctx.store.as_ref(), request).await?))
}

pub async fn search_listings<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(params): ApiQuery<MarketplaceSearchParams>,
) -> ApiResult<Json<MarketplaceResponse>> {
    Ok(Json(execute(ctx.store.as_ref(), params.into()).await?))
}

pub async fn query_listings<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiJson(request): ApiJson<MarketplaceQueryRequest>,
) -> ApiResult<Json<MarketplaceResponse>> {
    Ok(Json(execute(ctx.store.as_ref(), request).await?))
}
