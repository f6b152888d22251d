use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::model::UserContext;

/// Axum extractor for UserContext from request headers
///
/// The auth gateway in front of this service forwards the verified identity:
/// - X-User-Id: Required user identifier
/// - X-User-Email: Optional user email
/// - X-User-Name: Optional user display name
/// - X-User-Roles: Optional comma-separated roles (`admin,moderator`)
///
/// Requests without X-User-Id are rejected with 401.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let user_id = extract_header_value(headers, "x-user-id")
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;
        let user_email = extract_header_value(headers, "x-user-email");
        let user_name = extract_header_value(headers, "x-user-name");
        let roles = extract_header_value(headers, "x-user-roles")
            .map(|raw| parse_roles(&raw))
            .unwrap_or_default();

        Ok(UserContext::with_details(user_id, user_email, user_name).with_roles(roles))
    }
}

/// Extract header value as string, treating blank values as absent
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_lowercase)
        .collect()
}
