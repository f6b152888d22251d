use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::json_extractor::{ApiJson, ApiQuery};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    decode_document, now_rfc3339, LogData, LogPageParams, SearchHit, SearchParams, UserContext,
    MAX_PAGE_LIMIT,
};
use crate::store::{collection, DocPath, Document, Store};
use crate::translate::Translator;

/// Shared state handed to every handler
pub struct AppContext<S> {
    pub store: Arc<S>,
    pub translator: Arc<dyn Translator>,
    pub config: Arc<AppConfig>,
}

impl<S> AppContext<S> {
    pub fn new(store: Arc<S>, translator: Arc<dyn Translator>, config: AppConfig) -> Self {
        Self {
            store,
            translator,
            config: Arc::new(config),
        }
    }
}

pub type AppState<S> = Arc<AppContext<S>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> ApiResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Fetch and decode one document, 404 with `"{what} not found"` when missing
pub(crate) async fn load<S: Store, T: DeserializeOwned>(
    store: &S,
    path: &DocPath,
    id_field: &str,
    what: &str,
) -> ApiResult<T> {
    let data = store
        .get(path)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", what)))?;
    Ok(decode_document(path.id(), id_field, data)?)
}

/// Decode the current value inside a `modify` closure, failing with 404 when absent
pub(crate) fn existing<T: DeserializeOwned>(
    current: Option<Value>,
    id: &str,
    id_field: &str,
    what: &str,
) -> anyhow::Result<T> {
    let data = current.ok_or_else(|| ApiError::not_found(format!("{} not found", what)))?;
    Ok(decode_document(id, id_field, data)?)
}

/// Decode listed documents, skipping (and logging) any that do not fit the model
pub(crate) fn decode_all<T: DeserializeOwned>(documents: Vec<Document>, id_field: &str) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match decode_document(&doc.id, id_field, doc.data) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Skipping malformed document {}: {}", doc.id, e);
                None
            }
        })
        .collect()
}

/// Raw document bodies with their id merged in under `id_field`
pub(crate) fn with_ids(documents: Vec<Document>, id_field: &str) -> Vec<Value> {
    documents
        .into_iter()
        .map(|doc| {
            let mut data = doc.data;
            if let Value::Object(map) = &mut data {
                map.entry(id_field.to_string())
                    .or_insert_with(|| Value::String(doc.id.clone()));
            }
            data
        })
        .collect()
}

pub(crate) fn require_admin(user: &UserContext) -> ApiResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin role required"))
    }
}

pub(crate) fn require_moderator(user: &UserContext) -> ApiResult<()> {
    if user.is_moderator() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Moderator or admin role required"))
    }
}

// System and utility endpoints

pub async fn api_health() -> Json<Value> {
    Json(json!({"status": "ok", "message": "API is running smoothly."}))
}

pub async fn get_version() -> Json<Value> {
    Json(json!({"version": env!("CARGO_PKG_VERSION")}))
}

pub async fn get_config<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<Value>> {
    let config = ctx
        .store
        .get(&collection("config").doc("global"))
        .await?
        .ok_or_else(|| ApiError::not_found("Configuration not found."))?;
    Ok(Json(json!({ "config": config })))
}

pub async fn get_feature_flags<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    require_admin(&user)?;
    let flags = ctx
        .store
        .get(&collection("feature_flags").doc("active_flags"))
        .await?
        .ok_or_else(|| ApiError::not_found("Feature flags not found."))?;
    Ok(Json(json!({ "feature_flags": flags })))
}

pub async fn submit_log<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiJson(log_data): ApiJson<LogData>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let log_id = ctx.store.add(&collection("logs"), to_document(&log_data)?).await?;
    log::info!("Client {} log from {}: {}", log_data.log_type, log_data.user_id, log_data.message);
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Log submitted successfully.", "log_id": log_id})),
    ))
}

pub async fn get_system_logs<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiQuery(params): ApiQuery<LogPageParams>,
) -> ApiResult<Json<Value>> {
    require_admin(&user)?;
    if params.page == 0 || params.page > MAX_PAGE_LIMIT {
        return Err(ApiError::bad_request(format!("page must be between 1 and {}", MAX_PAGE_LIMIT)));
    }
    if params.limit == 0 || params.limit > MAX_PAGE_LIMIT {
        return Err(ApiError::bad_request(format!("limit must be between 1 and {}", MAX_PAGE_LIMIT)));
    }

    let mut logs: Vec<LogData> = decode_all(ctx.store.list(&collection("logs")).await?, "log_id");
    // RFC 3339 timestamps order lexicographically
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let page: Vec<LogData> = logs
        .into_iter()
        .skip((params.page - 1) * params.limit)
        .take(params.limit)
        .collect();
    if page.is_empty() {
        return Err(ApiError::not_found("No logs found."));
    }

    Ok(Json(json!({"logs": page, "page": params.page, "limit": params.limit})))
}

pub async fn list_users<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Value>> {
    require_admin(&user)?;
    let users = with_ids(ctx.store.list(&collection("users")).await?, "uid");
    Ok(Json(json!({ "users": users })))
}

/// Exact-name matches across listings, forum threads and groups
pub async fn global_search<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Value>> {
    let query = Value::String(params.query);
    let sources = [
        ("inventory", "name", "id"),
        ("forum_threads", "title", "thread_id"),
        ("groups", "name", "group_id"),
    ];

    let mut results = Vec::new();
    for (name, field, id_field) in sources {
        let matches = ctx.store.find_by_field(&collection(name), field, &query).await?;
        results.extend(with_ids(matches, id_field).into_iter().map(|data| SearchHit {
            collection: name.to_string(),
            data,
        }));
    }

    if results.is_empty() {
        return Err(ApiError::not_found("No results found."));
    }
    Ok(Json(json!({ "results": results })))
}
