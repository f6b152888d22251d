use axum::{extract::State, response::Json};
use serde_json::Value;

use crate::api::handlers::{require_admin, AppState};
use crate::api::json_extractor::ApiQuery;
use crate::error::{ApiError, ApiResult};
use crate::logic::{sales_report, system_usage, user_engagement};
use crate::model::{
    SalesPageParams, SalesReport, SystemUsage, UserContext, UserEngagement,
    DEFAULT_SALES_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use crate::store::{collection, Store};

async fn bodies<S: Store>(store: &S, name: &str) -> ApiResult<Vec<Value>> {
    let documents = store.list(&collection(name)).await?;
    Ok(documents.into_iter().map(|doc| doc.data).collect())
}

pub async fn get_user_engagement<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<UserEngagement>> {
    require_admin(&user)?;
    let users = bodies(ctx.store.as_ref(), "users").await?;
    Ok(Json(user_engagement(&users)))
}

/// Totals over `transactions`. With `page`, only that page of transactions
/// in timestamp order is summed.
pub async fn get_sales_report<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiQuery(params): ApiQuery<SalesPageParams>,
) -> ApiResult<Json<SalesReport>> {
    require_admin(&user)?;
    let mut transactions = bodies(ctx.store.as_ref(), "transactions").await?;

    let Some(page) = params.page else {
        return Ok(Json(sales_report(&transactions)));
    };
    let limit = params.limit.unwrap_or(DEFAULT_SALES_PAGE_LIMIT);
    if page == 0 {
        return Err(ApiError::bad_request("page must be at least 1"));
    }
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::bad_request(format!("limit must be between 1 and {}", MAX_PAGE_LIMIT)));
    }

    // RFC 3339 timestamps order lexicographically
    transactions.sort_by_cached_key(|t| {
        t.get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    });
    let window: Vec<Value> = transactions
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    let mut report = sales_report(&window);
    report.page = Some(page);
    report.limit = Some(limit);
    Ok(Json(report))
}

pub async fn get_system_usage<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<SystemUsage>> {
    require_admin(&user)?;
    let sessions = bodies(ctx.store.as_ref(), "sessions").await?;
    Ok(Json(system_usage(&sessions)))
}
