use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, message, require_admin, to_document, AppState, ListResponse,
    MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, Id, Notification, NotificationRequest,
    NotificationSubscriptionRequest, TopicSubscriptions, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn inbox(user_id: &str) -> CollectionPath {
    collection("users").doc(user_id).sub("notifications")
}

fn topics_path(user_id: &str) -> DocPath {
    collection("notification_topics").doc(user_id)
}

async fn user_notifications<S: Store>(store: &S, user_id: &str) -> ApiResult<Vec<Notification>> {
    Ok(decode_all(store.list(&inbox(user_id)).await?, "notification_id"))
}

pub async fn list_notifications<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<ListResponse<Notification>>> {
    let notifications = user_notifications(ctx.store.as_ref(), &user.user_id).await?;
    Ok(Json(ListResponse::new(notifications)))
}

pub async fn mark_read<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(notification_id): ApiPath<Id>,
) -> ApiResult<Json<Notification>> {
    let id = notification_id.clone();
    let notification = ctx
        .store
        .modify(&inbox(&user.user_id).doc(&notification_id), move |current| {
            let mut notification: Notification = existing(current, &id, "notification_id", "Notification")?;
            notification.read = true;
            Ok((Some(serde_json::to_value(&notification)?), notification))
        })
        .await?;
    Ok(Json(notification))
}

pub async fn delete_notification<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(notification_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    if !ctx.store.delete(&inbox(&user.user_id).doc(&notification_id)).await? {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(message("Notification deleted successfully."))
}

pub async fn unread_count<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    let notifications = user_notifications(ctx.store.as_ref(), &user.user_id).await?;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(json!({ "unread_count": unread })))
}

pub async fn send_notification<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NotificationRequest>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    require_admin(&user)?;

    let notification = Notification {
        notification_id: generate_push_id(),
        title: request.title,
        body: request.body,
        user_id: request.user_id,
        kind: request.kind,
        read: false,
        created_at: Some(now_rfc3339()),
    };
    let path = inbox(&notification.user_id).doc(&notification.notification_id);
    ctx.store.set(&path, to_document(&notification)?).await?;
    log::info!(
        "Notification {} stored for {} by {}",
        notification.notification_id,
        notification.user_id,
        user.user_id
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn subscribe_topic<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NotificationSubscriptionRequest>,
) -> ApiResult<Json<Value>> {
    let topic = request.topic.trim().to_string();
    if topic.is_empty() {
        return Err(ApiError::bad_request("Topic cannot be empty"));
    }

    let subscribed = topic.clone();
    let topics = ctx
        .store
        .modify(&topics_path(&user.user_id), move |current| {
            let mut subscriptions: TopicSubscriptions = match current {
                Some(data) => serde_json::from_value(data)?,
                None => TopicSubscriptions::default(),
            };
            subscriptions.subscribe(&subscribed);
            Ok((Some(serde_json::to_value(&subscriptions)?), subscriptions.topics))
        })
        .await?;
    Ok(Json(json!({"message": "Subscribed to topic successfully", "topic": topic, "topics": topics})))
}

pub async fn unsubscribe_topic<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NotificationSubscriptionRequest>,
) -> ApiResult<Json<Value>> {
    let topic = request.topic.trim().to_string();
    let unsubscribed = topic.clone();
    let topics = ctx
        .store
        .modify(&topics_path(&user.user_id), move |current| {
            let mut subscriptions: TopicSubscriptions = match current {
                Some(data) => serde_json::from_value(data)?,
                None => TopicSubscriptions::default(),
            };
            if !subscriptions.unsubscribe(&unsubscribed) {
                return Err(ApiError::not_found("Not subscribed to this topic").into());
            }
            Ok((Some(serde_json::to_value(&subscriptions)?), subscriptions.topics))
        })
        .await?;
    Ok(Json(json!({"message": "Unsubscribed from topic successfully", "topic": topic, "topics": topics})))
}
