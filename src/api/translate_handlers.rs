use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::api::handlers::AppState;
use crate::api::json_extractor::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub target_language: String,
}

pub async fn translate_text<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiJson(request): ApiJson<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    let target = request.target_language.trim().to_lowercase();
    if !ctx.config.supports_language(&target) {
        return Err(ApiError::bad_request(format!(
            "Unsupported language. Supported languages are: {}",
            ctx.config.translate.supported_languages.join(", ")
        )));
    }
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text cannot be empty"));
    }

    let translated_text = ctx
        .translator
        .translate(&request.text, &target)
        .await
        .map_err(|e| {
            log::error!("Translation to {} failed: {:#}", target, e);
            ApiError::Upstream(e.to_string())
        })?;

    Ok(Json(TranslateResponse {
        translated_text,
        target_language: target,
    }))
}
