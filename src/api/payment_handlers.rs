use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{decode_all, existing, load, message, to_document, AppState, MessageResponse};
use crate::api::json_extractor::{ApiJson, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::logic::verify_payment_signature;
use crate::model::{
    generate_push_id, now_rfc3339, IntegrationTokenRequest, Payment, PaymentConfirmation,
    PaymentRequest, PaymentStatus, PaymentStatusQuery, UserContext,
};
use crate::store::{collection, DocPath, Store};

fn payment_path(order_id: &str) -> DocPath {
    collection("payments").doc(order_id)
}

pub async fn initiate_payment<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    if request.amount == 0 {
        return Err(ApiError::bad_request("Amount must be greater than zero"));
    }

    let payment = Payment {
        order_id: format!("order_{}", generate_push_id()),
        user_id: user.user_id.clone(),
        amount: request.amount,
        currency: request.currency.to_uppercase(),
        receipt_id: request.receipt_id,
        status: PaymentStatus::Created,
        created_at: now_rfc3339(),
        payment_id: None,
        paid_at: None,
    };
    ctx.store
        .set(&payment_path(&payment.order_id), to_document(&payment)?)
        .await?;

    log::info!(
        "Payment order {} created for {} ({} {})",
        payment.order_id,
        user.user_id,
        payment.amount,
        payment.currency
    );
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_payment_status<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiQuery(query): ApiQuery<PaymentStatusQuery>,
) -> ApiResult<Json<Value>> {
    let payment: Payment = load(ctx.store.as_ref(), &payment_path(&query.order_id), "order_id", "Payment").await?;
    if payment.user_id != user.user_id && !user.is_admin() {
        return Err(ApiError::forbidden("This payment belongs to another user"));
    }
    Ok(Json(json!({"order_id": payment.order_id, "status": payment.status})))
}

pub async fn confirm_payment<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(confirmation): ApiJson<PaymentConfirmation>,
) -> ApiResult<Json<Payment>> {
    let secret = ctx
        .config
        .payments
        .key_secret
        .as_deref()
        .ok_or_else(|| ApiError::Unavailable("Payment verification is not configured".to_string()))?;

    if !verify_payment_signature(
        secret,
        &confirmation.order_id,
        &confirmation.payment_id,
        &confirmation.signature,
    ) {
        log::warn!(
            "Rejected payment confirmation for {} from {}",
            confirmation.order_id,
            user.user_id
        );
        return Err(ApiError::bad_request("Invalid payment signature"));
    }

    let now = now_rfc3339();
    let caller = user.user_id.clone();
    let order_id = confirmation.order_id.clone();
    let payment = ctx
        .store
        .modify(&payment_path(&confirmation.order_id), move |current| {
            let mut payment: Payment = existing(current, &order_id, "order_id", "Payment")?;
            if payment.user_id != caller {
                return Err(ApiError::forbidden("This payment belongs to another user").into());
            }
            payment.status = PaymentStatus::Paid;
            payment.payment_id = Some(confirmation.payment_id);
            payment.paid_at = Some(now);
            Ok((Some(serde_json::to_value(&payment)?), payment))
        })
        .await?;

    log::info!("Payment for {} confirmed", payment.order_id);
    Ok(Json(payment))
}

pub async fn get_payment_history<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    let documents = ctx
        .store
        .find_by_field(&collection("payments"), "user_id", &json!(user.user_id))
        .await?;
    let payments: Vec<Payment> = decode_all(documents, "order_id");
    if payments.is_empty() {
        return Err(ApiError::not_found("No payment history found."));
    }
    Ok(Json(json!({ "payments": payments })))
}

pub async fn store_integration_token<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<IntegrationTokenRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if request.provider.trim().is_empty() || request.token.trim().is_empty() {
        return Err(ApiError::bad_request("provider and token are required"));
    }
    let document = json!({
        "token": request.token,
        "user_id": user.user_id,
        "updated_at": now_rfc3339(),
    });
    ctx.store
        .set(&collection("integrations_tokens").doc(&request.provider), document)
        .await?;
    Ok(message("Integration token stored successfully."))
}
