use axum::{extract::State, response::Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::api::handlers::{message, to_document, AppState, MessageResponse};
use crate::api::inventory_handlers::record_history;
use crate::api::json_extractor::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::logic::resolve_conflict;
use crate::model::{
    decode_document, now_rfc3339, HistoryAction, InventoryItem, InventorySyncAction,
    InventorySyncItem, ItemStatus, Measure, Order, OrderStatus, OrderSyncAction, OrderSyncItem,
    SyncAsset, SyncChatRequest, SyncConflictResolution, SyncInventoryRequest, SyncOrderRequest,
    SyncStatus, UserContext, UserSettingsSync,
};
use crate::store::{collection, DocPath, Store};

fn sync_status_path(user_id: &str) -> DocPath {
    collection("user_sync_status").doc(user_id)
}

/// Stamp the caller's sync status after a successful sync
async fn mark_synced<S: Store>(store: &S, user: &UserContext) -> ApiResult<()> {
    let status = SyncStatus::synced(now_rfc3339());
    store
        .set(&sync_status_path(&user.user_id), to_document(&status)?)
        .await?;
    Ok(())
}

fn synced_item(entry: &InventorySyncItem, owner_id: &str, now: &str) -> InventoryItem {
    InventoryItem {
        id: entry.item_id.clone(),
        name: entry.name.clone(),
        category: entry.category.clone(),
        quantity: Measure::new(entry.quantity, ""),
        price: Measure::new(entry.price, ""),
        storage: Default::default(),
        description: None,
        farm: None,
        pincode: None,
        location: None,
        image_url: entry.image_url.clone(),
        ratings: Vec::new(),
        average_rating: 0.0,
        item_status: ItemStatus::for_quantity(entry.quantity),
        owner_id: Some(owner_id.to_string()),
        created_at: Some(now.to_string()),
        updated_at: Some(now.to_string()),
    }
}

/// Refuse entries that touch an item the caller may not edit
fn check_inventory_entry(
    current: Option<&InventoryItem>,
    entry: &InventorySyncItem,
    user: &UserContext,
) -> ApiResult<()> {
    match current {
        Some(item) if !item.editable_by(user) => Err(ApiError::forbidden(format!(
            "Item {} belongs to another user",
            entry.item_id
        ))),
        _ => Ok(()),
    }
}

fn apply_synced_fields(item: &mut InventoryItem, entry: InventorySyncItem, now: String) {
    item.name = entry.name;
    item.category = entry.category;
    item.quantity.value = entry.quantity;
    item.price.value = entry.price;
    if entry.image_url.is_some() {
        item.image_url = entry.image_url;
    }
    item.item_status = ItemStatus::for_quantity(entry.quantity);
    item.updated_at = Some(now);
}

fn decode_current<T: DeserializeOwned>(
    current: Option<Value>,
    id: &str,
    id_field: &str,
) -> serde_json::Result<Option<T>> {
    current.map(|data| decode_document(id, id_field, data)).transpose()
}

pub async fn sync_inventory<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<SyncInventoryRequest>,
) -> ApiResult<Json<Value>> {
    // Nothing is written unless every entry passes
    for entry in &request.items {
        let current = ctx.store.get(&collection("inventory").doc(&entry.item_id)).await?;
        let current: Option<InventoryItem> = decode_current(current, &entry.item_id, "id")?;
        check_inventory_entry(current.as_ref(), entry, &user)?;
    }

    let now = now_rfc3339();
    for entry in request.items.iter().cloned() {
        let path = collection("inventory").doc(&entry.item_id);
        let caller = user.clone();
        let now = now.clone();
        let change = ctx
            .store
            .modify(&path, move |current| {
                let current: Option<InventoryItem> = decode_current(current, &entry.item_id, "id")?;
                check_inventory_entry(current.as_ref(), &entry, &caller)?;
                Ok(match (entry.action, current) {
                    (InventorySyncAction::Remove, Some(item)) => {
                        (None, Some((item, HistoryAction::Deleted)))
                    }
                    (InventorySyncAction::Remove, None) => (None, None),
                    (_, Some(mut item)) => {
                        apply_synced_fields(&mut item, entry, now);
                        (Some(serde_json::to_value(&item)?), Some((item, HistoryAction::Updated)))
                    }
                    // Offline edits to items the server never saw become creations
                    (_, None) => {
                        let item = synced_item(&entry, &caller.user_id, &now);
                        (Some(serde_json::to_value(&item)?), Some((item, HistoryAction::Created)))
                    }
                })
            })
            .await?;

        if let Some((item, action)) = change {
            record_history(ctx.store.as_ref(), &item, action, &user).await?;
        }
    }

    mark_synced(ctx.store.as_ref(), &user).await?;
    log::info!("Synced {} inventory changes for {}", request.items.len(), user.user_id);
    Ok(Json(json!({"message": "Inventory synced successfully.", "synced": request.items.len()})))
}

pub async fn sync_chat<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<SyncChatRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(foreign) = request.messages.iter().find(|m| m.sender_id != user.user_id) {
        return Err(ApiError::forbidden(format!(
            "Message {} was not sent by the caller",
            foreign.message_id
        )));
    }

    for msg in &request.messages {
        let path = collection("chats")
            .doc(&msg.conversation_id)
            .sub("messages")
            .doc(&msg.message_id);
        ctx.store
            .set(
                &path,
                json!({
                    "sender_id": msg.sender_id,
                    "message": msg.message,
                    "timestamp": msg.timestamp,
                }),
            )
            .await?;
    }

    mark_synced(ctx.store.as_ref(), &user).await?;
    Ok(Json(json!({"message": "Chat messages synced successfully.", "synced": request.messages.len()})))
}

/// Adds must not overwrite; updates and cancels need a party to a live order
fn check_order_entry(current: Option<&Order>, entry: &OrderSyncItem, caller: &str) -> ApiResult<()> {
    match (entry.action, current) {
        (OrderSyncAction::Add, Some(_)) => Err(ApiError::conflict(format!(
            "Order {} already exists",
            entry.order_id
        ))),
        (OrderSyncAction::Add, None) => Ok(()),
        (_, None) => Err(ApiError::not_found("Order not found")),
        (_, Some(order)) if !order.is_party(caller) => Err(ApiError::forbidden(format!(
            "You are not a party to order {}",
            entry.order_id
        ))),
        (_, Some(order)) if order.status.is_terminal() => Err(ApiError::conflict(format!(
            "Order {} is already {}",
            entry.order_id, order.status
        ))),
        _ => Ok(()),
    }
}

pub async fn sync_orders<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<SyncOrderRequest>,
) -> ApiResult<Json<Value>> {
    // Validate every entry before writing anything
    let mut statuses = Vec::with_capacity(request.orders.len());
    for entry in &request.orders {
        let status = match entry.action {
            OrderSyncAction::Cancel => OrderStatus::Cancelled,
            _ => entry.order_status.parse::<OrderStatus>().map_err(ApiError::BadRequest)?,
        };
        let current = ctx.store.get(&collection("orders").doc(&entry.order_id)).await?;
        let current: Option<Order> = decode_current(current, &entry.order_id, "orderId")?;
        check_order_entry(current.as_ref(), entry, &user.user_id)?;
        statuses.push(status);
    }

    let now = now_rfc3339();
    for (entry, status) in request.orders.iter().cloned().zip(statuses) {
        let path = collection("orders").doc(&entry.order_id);
        let caller = user.user_id.clone();
        let now = now.clone();
        ctx.store
            .modify(&path, move |current| {
                let current: Option<Order> = decode_current(current, &entry.order_id, "orderId")?;
                check_order_entry(current.as_ref(), &entry, &caller)?;
                let order = match current {
                    None => Order {
                        order_id: entry.order_id,
                        buyer_id: caller,
                        status,
                        created_at: Some(now),
                        items: entry.items,
                        delivery_address: entry.delivery_address,
                        payment_status: entry.payment_status,
                        ..Default::default()
                    },
                    Some(mut order) => {
                        order.status = status;
                        if entry.action == OrderSyncAction::Update {
                            if !entry.items.is_empty() {
                                order.items = entry.items;
                            }
                            if entry.delivery_address.is_some() {
                                order.delivery_address = entry.delivery_address;
                            }
                            if entry.payment_status.is_some() {
                                order.payment_status = entry.payment_status;
                            }
                        }
                        order
                    }
                };
                Ok((Some(serde_json::to_value(&order)?), ()))
            })
            .await?;
    }

    mark_synced(ctx.store.as_ref(), &user).await?;
    Ok(Json(json!({"message": "Orders synced successfully.", "synced": request.orders.len()})))
}

pub async fn sync_settings<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(settings): ApiJson<UserSettingsSync>,
) -> ApiResult<Json<MessageResponse>> {
    if !user.is(&settings.user_id) {
        return Err(ApiError::forbidden("You can only sync your own settings"));
    }
    ctx.store
        .set(&collection("user_settings").doc(&settings.user_id), to_document(&settings)?)
        .await?;
    mark_synced(ctx.store.as_ref(), &user).await?;
    Ok(message("User settings synced successfully."))
}

pub async fn resolve_sync_conflict<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<SyncConflictResolution>,
) -> ApiResult<Json<Value>> {
    let path = collection("user_data").doc(&request.document_id);
    let field = request.field_name.clone();

    let resolved = ctx
        .store
        .modify(&path, move |current| {
            let mut data = match current {
                Some(Value::Object(map)) => map,
                Some(_) => Map::new(),
                None => return Err(ApiError::not_found("Document not found").into()),
            };
            let client_view = request.server_value.map(Value::String);
            let server = data.get(&request.field_name).or(client_view.as_ref());
            let value = resolve_conflict(server, &request.local_value, request.resolution_action);
            data.insert(request.field_name, value.clone());
            Ok((Some(Value::Object(data)), value))
        })
        .await?;

    mark_synced(ctx.store.as_ref(), &user).await?;
    Ok(Json(json!({
        "message": "Conflict resolved successfully.",
        "field_name": field,
        "resolved_value": resolved,
    })))
}

pub async fn sync_assets<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(assets): ApiJson<Vec<SyncAsset>>,
) -> ApiResult<Json<Value>> {
    let now = now_rfc3339();
    for asset in &assets {
        ctx.store
            .set(
                &collection("user_assets").doc(&asset.asset_name),
                json!({
                    "asset_url": asset.asset_url,
                    "user_id": user.user_id,
                    "synced_at": now,
                }),
            )
            .await?;
    }

    mark_synced(ctx.store.as_ref(), &user).await?;
    Ok(Json(json!({"message": "Assets synced successfully.", "synced": assets.len()})))
}

pub async fn get_sync_status<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    match ctx.store.get(&sync_status_path(&user.user_id)).await? {
        Some(status) => Ok(Json(status)),
        None => Ok(Json(json!({"message": "Sync status not found."}))),
    }
}
