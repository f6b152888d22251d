use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use itertools::Itertools;
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, load, message, to_document, with_ids, AppState, ListResponse,
    MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, Id, NewOrder, Order, OrderCancellation, OrderFeedback,
    OrderStatus, OrderStatusUpdate, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn orders() -> CollectionPath {
    collection("orders")
}

fn order_path(order_id: &str) -> DocPath {
    orders().doc(order_id)
}

/// Load an order the caller is a party to
async fn party_order<S: Store>(store: &S, order_id: &str, user: &UserContext) -> ApiResult<Order> {
    let order: Order = load(store, &order_path(order_id), "orderId", "Order").await?;
    if !order.is_party(&user.user_id) {
        return Err(ApiError::forbidden("You are not a party to this order"));
    }
    Ok(order)
}

/// Apply `change` to an order the caller is a party to, refusing terminal orders
async fn transition<S, F>(store: &S, order_id: Id, user: &UserContext, change: F) -> ApiResult<Order>
where
    S: Store,
    F: FnOnce(&mut Order) + Send,
{
    let caller = user.user_id.clone();
    let path = order_path(&order_id);
    let order = store
        .modify(&path, move |current| {
            let mut order: Order = existing(current, &order_id, "orderId", "Order")?;
            if !order.is_party(&caller) {
                return Err(ApiError::forbidden("You are not a party to this order").into());
            }
            if order.status.is_terminal() {
                return Err(ApiError::conflict(format!("Order is already {}", order.status)).into());
            }
            change(&mut order);
            Ok((Some(serde_json::to_value(&order)?), order))
        })
        .await?;
    Ok(order)
}

pub async fn list_orders<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<ListResponse<Order>>> {
    let caller = json!(user.user_id);
    let mut documents = ctx.store.find_by_field(&orders(), "farmerId", &caller).await?;
    documents.extend(ctx.store.find_by_field(&orders(), "buyerId", &caller).await?);

    let documents = documents
        .into_iter()
        .unique_by(|doc| doc.id.clone())
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();
    Ok(Json(ListResponse::new(decode_all(documents, "orderId"))))
}

pub async fn create_order<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    if !user.is(&request.farmer_id) {
        return Err(ApiError::forbidden("Only the farmer can create this order"));
    }

    let order = request.into_order(generate_push_id(), now_rfc3339());
    ctx.store
        .set(&order_path(&order.order_id), to_document(&order)?)
        .await?;
    log::info!("Order {} created by {}", order.order_id, user.user_id);
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
) -> ApiResult<Json<Order>> {
    Ok(Json(party_order(ctx.store.as_ref(), &order_id, &user).await?))
}

pub async fn update_order_status<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
    ApiJson(update): ApiJson<OrderStatusUpdate>,
) -> ApiResult<Json<Order>> {
    let order = transition(ctx.store.as_ref(), order_id, &user, move |order| {
        order.status = update.status;
    })
    .await?;
    log::info!("Order {} moved to {}", order.order_id, order.status);
    Ok(Json(order))
}

pub async fn delete_order<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = user.user_id.clone();
    let id = order_id.clone();
    ctx.store
        .modify(&order_path(&order_id), move |current| {
            let order: Order = existing(current, &id, "orderId", "Order")?;
            if order.farmer_id != caller {
                return Err(ApiError::forbidden("Only the farmer can delete this order").into());
            }
            Ok((None, ()))
        })
        .await?;
    Ok(message("Order deleted successfully."))
}

pub async fn get_order_tracking<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let order = party_order(ctx.store.as_ref(), &order_id, &user).await?;
    Ok(Json(json!({
        "orderId": order.order_id,
        "status": order.status,
        "tracking": order.tracking,
    })))
}

pub async fn get_order_chat<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<Value>>> {
    party_order(ctx.store.as_ref(), &order_id, &user).await?;
    let messages = ctx.store.list(&order_path(&order_id).sub("chat")).await?;
    Ok(Json(ListResponse::new(with_ids(messages, "message_id"))))
}

pub async fn cancel_order<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
    ApiJson(request): ApiJson<OrderCancellation>,
) -> ApiResult<Json<Order>> {
    let order = transition(ctx.store.as_ref(), order_id, &user, move |order| {
        order.status = OrderStatus::Cancelled;
        order.cancellation_reason = Some(request.reason);
    })
    .await?;
    log::info!("Order {} cancelled by {}", order.order_id, user.user_id);
    Ok(Json(order))
}

pub async fn submit_feedback<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(order_id): ApiPath<Id>,
    ApiJson(feedback): ApiJson<OrderFeedback>,
) -> ApiResult<Json<Order>> {
    if !(1..=5).contains(&feedback.rating) {
        return Err(ApiError::bad_request("Rating must be between 1 and 5"));
    }

    let caller = user.user_id.clone();
    let id = order_id.clone();
    let order = ctx
        .store
        .modify(&order_path(&order_id), move |current| {
            let mut order: Order = existing(current, &id, "orderId", "Order")?;
            if order.buyer_id != caller {
                return Err(ApiError::forbidden("Only the buyer can leave feedback").into());
            }
            order.feedback = Some(feedback);
            Ok((Some(serde_json::to_value(&order)?), order))
        })
        .await?;
    Ok(Json(order))
}
