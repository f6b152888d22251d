use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, load, message, to_document, AppState, ListResponse, MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, HistoryAction, Id, InventoryHistoryEntry, InventoryItem,
    InventoryItemUpdate, NewInventoryItem, StorageType, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn inventory() -> CollectionPath {
    collection("inventory")
}

fn item_path(item_id: &str) -> DocPath {
    inventory().doc(item_id)
}

#[derive(Debug, Deserialize)]
pub struct StorageFilter {
    pub storage: Option<StorageType>,
}

#[derive(Debug, Deserialize)]
pub struct InventorySearchQuery {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub storage_type: Option<StorageType>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub storage: Option<StorageType>,
    /// Comma-separated category names
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub storage_type: Option<StorageType>,
}

pub(crate) async fn record_history<S: Store>(
    store: &S,
    item: &InventoryItem,
    action: HistoryAction,
    user: &UserContext,
) -> ApiResult<()> {
    let entry = InventoryHistoryEntry {
        item_id: item.id.clone(),
        action,
        storage: item.storage,
        user_id: user.user_id.clone(),
        timestamp: now_rfc3339(),
        snapshot: Some(item.clone()),
    };
    store
        .add(&collection("inventory_history"), to_document(&entry)?)
        .await?;
    Ok(())
}

async fn all_items<S: Store>(store: &S, storage: Option<StorageType>) -> ApiResult<Vec<InventoryItem>> {
    let documents = match storage {
        Some(storage) => {
            store
                .find_by_field(&inventory(), "storage", &json!(storage.as_str()))
                .await?
        }
        None => store.list(&inventory()).await?,
    };
    Ok(decode_all(documents, "id"))
}

pub async fn create_item<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NewInventoryItem>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let now = now_rfc3339();
    let mut item = request.into_item(&user.user_id, &now);
    if item.id.is_empty() {
        item.id = generate_push_id();
    }

    let document = to_document(&item)?;
    let item_id: Id = item.id.clone();
    ctx.store
        .modify(&item_path(&item_id), move |current| {
            if current.is_some() {
                return Err(ApiError::conflict(format!("Item {} already exists", item_id)).into());
            }
            Ok((Some(document), ()))
        })
        .await
        .map_err(ApiError::from)?;

    record_history(ctx.store.as_ref(), &item, HistoryAction::Created, &user).await?;
    log::info!("User {} listed item {} ({})", user.user_id, item.id, item.name);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(filter): ApiQuery<StorageFilter>,
) -> ApiResult<Json<ListResponse<InventoryItem>>> {
    let items = all_items(ctx.store.as_ref(), filter.storage).await?;
    Ok(Json(ListResponse::new(items)))
}

pub async fn search_items<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<InventorySearchQuery>,
) -> ApiResult<Json<ListResponse<InventoryItem>>> {
    let keyword = query.keyword.as_deref().map(str::to_lowercase);
    let items = all_items(ctx.store.as_ref(), query.storage_type)
        .await?
        .into_iter()
        .filter(|item| {
            query
                .category
                .as_deref()
                .map_or(true, |c| item.category.eq_ignore_ascii_case(c))
        })
        .filter(|item| {
            query.location.as_deref().map_or(true, |l| {
                item.location
                    .as_deref()
                    .map_or(false, |location| location.eq_ignore_ascii_case(l))
            })
        })
        .filter(|item| {
            keyword
                .as_deref()
                .map_or(true, |k| item.name.to_lowercase().contains(k))
        })
        .collect();
    Ok(Json(ListResponse::new(items)))
}

/// Distinct categories present in the inventory, restricted to the
/// requested ones when `category` is given
pub async fn list_categories<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CategoriesQuery>,
) -> ApiResult<Json<Value>> {
    let requested: Option<Vec<String>> = query.category.as_deref().map(|raw| {
        raw.split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    });

    let categories: Vec<String> = all_items(ctx.store.as_ref(), query.storage)
        .await?
        .into_iter()
        .map(|item| item.category)
        .filter(|category| {
            requested
                .as_ref()
                .map_or(true, |wanted| wanted.iter().any(|w| w == category))
        })
        .unique()
        .collect();

    Ok(Json(json!({ "categories": categories })))
}

pub async fn get_history<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<ListResponse<InventoryHistoryEntry>>> {
    let history = collection("inventory_history");
    let documents = match query.storage_type {
        Some(storage) => {
            ctx.store
                .find_by_field(&history, "storage", &json!(storage.as_str()))
                .await?
        }
        None => ctx.store.list(&history).await?,
    };
    Ok(Json(ListResponse::new(decode_all(documents, "entry_id"))))
}

pub async fn get_analytics<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<Value>> {
    let items = all_items(ctx.store.as_ref(), None).await?;
    let counts = items.iter().counts_by(|item| item.storage);
    let count = |storage: StorageType| counts.get(&storage).copied().unwrap_or(0);

    Ok(Json(json!({
        "self_stored": count(StorageType::SelfStored),
        "externally_stored": count(StorageType::ExternallyStored),
        "total": items.len(),
    })))
}

pub async fn get_item<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(item_id): ApiPath<Id>,
) -> ApiResult<Json<InventoryItem>> {
    let item = load(ctx.store.as_ref(), &item_path(&item_id), "id", "Item").await?;
    Ok(Json(item))
}

pub async fn update_item<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(item_id): ApiPath<Id>,
    ApiJson(update): ApiJson<InventoryItemUpdate>,
) -> ApiResult<Json<InventoryItem>> {
    let now = now_rfc3339();
    let caller = user.clone();
    let id = item_id.clone();

    let item = ctx
        .store
        .modify(&item_path(&item_id), move |current| {
            let mut item: InventoryItem = existing(current, &id, "id", "Item")?;
            if !item.editable_by(&caller) {
                return Err(ApiError::forbidden("Only the owner can modify this item").into());
            }
            update.apply_to(&mut item, &now);
            Ok((Some(serde_json::to_value(&item)?), item))
        })
        .await
        .map_err(ApiError::from)?;

    record_history(ctx.store.as_ref(), &item, HistoryAction::Updated, &user).await?;
    Ok(Json(item))
}

pub async fn delete_item<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(item_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = user.clone();
    let id = item_id.clone();

    let item = ctx
        .store
        .modify(&item_path(&item_id), move |current| {
            let item: InventoryItem = existing(current, &id, "id", "Item")?;
            if !item.editable_by(&caller) {
                return Err(ApiError::forbidden("Only the owner can delete this item").into());
            }
            Ok((None, item))
        })
        .await
        .map_err(ApiError::from)?;

    record_history(ctx.store.as_ref(), &item, HistoryAction::Deleted, &user).await?;
    log::info!("User {} deleted item {}", user.user_id, item_id);
    Ok(message("Item deleted successfully."))
}
