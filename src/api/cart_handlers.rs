use axum::{
    extract::State,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{load, message, AppState, MessageResponse};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    AddToCartRequest, Cart, CartAddError, CartView, Id, InventoryItem, UpdateCartQuantity,
    UserContext,
};
use crate::store::{collection, DocPath, Store};

fn cart_path(user_id: &str) -> DocPath {
    collection("carts").doc(user_id)
}

fn read_cart(current: Option<Value>) -> anyhow::Result<Cart> {
    Ok(match current {
        Some(data) => serde_json::from_value(data)?,
        None => Cart::default(),
    })
}

fn positive_quantity(quantity: i64) -> ApiResult<u32> {
    if quantity < 1 {
        return Err(ApiError::bad_request("Quantity must be at least 1"));
    }
    u32::try_from(quantity).map_err(|_| ApiError::bad_request("Quantity is too large"))
}

pub async fn add_to_cart<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> ApiResult<Json<Value>> {
    let quantity = positive_quantity(request.quantity)?;
    let item: InventoryItem = load(
        ctx.store.as_ref(),
        &collection("inventory").doc(&request.item_id),
        "id",
        "Item",
    )
    .await?;
    // Listings without a farm are grouped by their owner
    let farm_id = item
        .farm
        .clone()
        .or_else(|| item.owner_id.clone())
        .unwrap_or_default();

    let item_id = request.item_id.clone();
    let cart = ctx
        .store
        .modify(&cart_path(&user.user_id), move |current| {
            let mut cart = read_cart(current)?;
            cart.add(&item_id, quantity, &farm_id).map_err(|err| match err {
                CartAddError::OtherFarm => {
                    ApiError::bad_request("Cart already contains items from another farm")
                }
            })?;
            Ok((Some(serde_json::to_value(&cart)?), cart))
        })
        .await?;

    Ok(Json(json!({"message": "Item added to cart.", "cart": cart})))
}

pub async fn get_cart<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<CartView>> {
    let cart = read_cart(ctx.store.get(&cart_path(&user.user_id)).await?)?;

    let mut total_bill = 0.0;
    for line in &cart.items {
        let path = collection("inventory").doc(&line.item_id);
        // Lines whose listing has since been removed do not count
        if let Some(data) = ctx.store.get(&path).await? {
            let item: InventoryItem = serde_json::from_value(data)?;
            total_bill += item.price.value * f64::from(line.quantity);
        }
    }

    Ok(Json(CartView {
        items: cart.items,
        total_bill,
    }))
}

pub async fn update_cart_item<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(item_id): ApiPath<Id>,
    ApiJson(update): ApiJson<UpdateCartQuantity>,
) -> ApiResult<Json<Value>> {
    let quantity = positive_quantity(update.quantity)?;
    let cart = ctx
        .store
        .modify(&cart_path(&user.user_id), move |current| {
            let mut cart = read_cart(current)?;
            if !cart.set_quantity(&item_id, quantity) {
                return Err(ApiError::not_found("Item not found in cart").into());
            }
            Ok((Some(serde_json::to_value(&cart)?), cart))
        })
        .await?;

    Ok(Json(json!({"message": "Cart updated.", "cart": cart})))
}

pub async fn remove_cart_item<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(item_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.store
        .modify(&cart_path(&user.user_id), move |current| {
            let mut cart = read_cart(current)?;
            if !cart.remove(&item_id) {
                return Err(ApiError::not_found("Item not found in cart").into());
            }
            Ok((Some(serde_json::to_value(&cart)?), ()))
        })
        .await?;

    Ok(message("Item removed from cart."))
}

pub async fn empty_cart<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<MessageResponse>> {
    ctx.store.delete(&cart_path(&user.user_id)).await?;
    Ok(message("Cart emptied."))
}
