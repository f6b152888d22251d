use axum::{extract::State, response::Json};
use serde_json::{Map, Value};

use crate::api::handlers::{load, to_document, AppState};
use crate::api::json_extractor::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::model::{now_rfc3339, Profile, ProfileRequest, UserContext};
use crate::store::{collection, Store};

/// Write the profile fields of `users/{uid}`, keeping fields the profile
/// form does not own (such as `favorites`)
pub async fn update_profile<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> ApiResult<Json<Profile>> {
    request.validate().map_err(ApiError::BadRequest)?;

    let profile = request.into_profile(user.user_id.clone(), user.user_email.clone(), now_rfc3339());
    let fields = to_document(&profile)?;
    ctx.store
        .modify(&collection("users").doc(&user.user_id), move |current| {
            let mut data = match current {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            if let Value::Object(fields) = fields {
                data.extend(fields);
            }
            Ok((Some(Value::Object(data)), ()))
        })
        .await?;
    log::info!("Profile updated for {}", user.user_id);
    Ok(Json(profile))
}

pub async fn get_profile<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<Profile>> {
    let profile = load(ctx.store.as_ref(), &collection("users").doc(&user.user_id), "uid", "Profile").await?;
    Ok(Json(profile))
}
