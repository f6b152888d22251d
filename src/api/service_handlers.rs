use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Map, Value};

use crate::api::handlers::{
    decode_all, existing, load, message, to_document, AppState, ListResponse, MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, ColdStorageService, ColdStorageServiceRequest, Id, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn services() -> CollectionPath {
    collection("cold_storage_services")
}

fn service_path(service_id: &str) -> DocPath {
    services().doc(service_id)
}

pub async fn create_service<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ColdStorageServiceRequest>,
) -> ApiResult<(StatusCode, Json<ColdStorageService>)> {
    request.validate().map_err(ApiError::BadRequest)?;
    let service = request.into_service(generate_push_id(), user.user_id.clone(), now_rfc3339());
    ctx.store
        .set(&service_path(&service.service_id), to_document(&service)?)
        .await?;
    log::info!("User {} listed cold storage service {}", user.user_id, service.service_id);
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn list_services<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<ColdStorageService>>> {
    let documents = ctx.store.list(&services()).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "service_id"))))
}

pub async fn get_service<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(service_id): ApiPath<Id>,
) -> ApiResult<Json<ColdStorageService>> {
    let service = load(ctx.store.as_ref(), &service_path(&service_id), "service_id", "Service").await?;
    Ok(Json(service))
}

pub async fn update_service<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(service_id): ApiPath<Id>,
    ApiJson(request): ApiJson<ColdStorageServiceRequest>,
) -> ApiResult<Json<ColdStorageService>> {
    request.validate().map_err(ApiError::BadRequest)?;
    let now = now_rfc3339();
    let id = service_id.clone();
    let service = ctx
        .store
        .modify(&service_path(&service_id), move |current| {
            let mut service: ColdStorageService = existing(current, &id, "service_id", "Service")?;
            if !service.editable_by(&user) {
                return Err(
                    ApiError::forbidden("Only the owner or an admin can update this service").into(),
                );
            }
            request.apply_to(&mut service, now);
            Ok((Some(serde_json::to_value(&service)?), service))
        })
        .await?;
    Ok(Json(service))
}

pub async fn delete_service<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(service_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    let id = service_id.clone();
    ctx.store
        .modify(&service_path(&service_id), move |current| {
            let service: ColdStorageService = existing(current, &id, "service_id", "Service")?;
            if !service.editable_by(&user) {
                return Err(
                    ApiError::forbidden("Only the owner or an admin can delete this service").into(),
                );
            }
            Ok((None, ()))
        })
        .await?;
    Ok(message("Service listing deleted successfully"))
}

/// Edit the caller's `favorites` list on `users/{uid}`; only farmers keep favorites
async fn update_favorites<S, F>(
    store: &S,
    user: &UserContext,
    service_id: &str,
    change: F,
) -> ApiResult<Vec<String>>
where
    S: Store,
    F: FnOnce(&mut Vec<String>) + Send,
{
    load::<S, ColdStorageService>(store, &service_path(service_id), "service_id", "Service").await?;

    let favorites = store
        .modify(&collection("users").doc(&user.user_id), move |current| {
            let mut data = match current {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let is_farmer = data
                .get("occupation")
                .and_then(Value::as_str)
                .map_or(false, |occupation| occupation.eq_ignore_ascii_case("farmer"));
            if !is_farmer {
                return Err(ApiError::forbidden("Only farmers can manage favorite services").into());
            }

            let mut favorites: Vec<String> = data
                .get("favorites")
                .cloned()
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();
            change(&mut favorites);
            data.insert("favorites".to_string(), json!(favorites));
            Ok((Some(Value::Object(data)), favorites))
        })
        .await?;
    Ok(favorites)
}

pub async fn mark_favorite<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(service_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let id = service_id.clone();
    let favorites = update_favorites(ctx.store.as_ref(), &user, &service_id, move |favorites| {
        if !favorites.contains(&id) {
            favorites.push(id);
        }
    })
    .await?;
    Ok(Json(json!({"message": "Service marked as favorite", "favorites": favorites})))
}

pub async fn unmark_favorite<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(service_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let id = service_id.clone();
    let favorites = update_favorites(ctx.store.as_ref(), &user, &service_id, move |favorites| {
        favorites.retain(|favorite| favorite != &id);
    })
    .await?;
    Ok(Json(json!({"message": "Service unmarked as favorite", "favorites": favorites})))
}
