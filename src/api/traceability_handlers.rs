use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};

use crate::api::handlers::{
    decode_all, existing, message, require_moderator, to_document, AppState, ListResponse,
    MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, Id, ModerateReviewRequest, ProductQuery, Review,
    ReviewRequest, ReviewSummary, TraceabilityDocument, TraceabilityDocumentRequest,
    TraceabilityRecord, TraceabilityScan, TraceabilityScanRequest, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn traceability_path(product_id: &str) -> DocPath {
    collection("traceability").doc(product_id)
}

fn reviews(product_id: &str) -> CollectionPath {
    collection("products").doc(product_id).sub("reviews")
}

fn validate_rating(rating: u8) -> ApiResult<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Rating must be between 1 and 5"))
    }
}

async fn product_reviews<S: Store>(store: &S, product_id: &str) -> ApiResult<Vec<Review>> {
    Ok(decode_all(store.list(&reviews(product_id)).await?, "review_id"))
}

/// Copy the product's ratings onto its inventory listing, if there is one
async fn refresh_listing_rating<S: Store>(store: &S, product_id: &str) -> ApiResult<()> {
    let ratings: Vec<u8> = product_reviews(store, product_id)
        .await?
        .iter()
        .map(|review| review.rating)
        .collect();
    let summary = ReviewSummary::from_ratings(&ratings);

    let mut fields = Map::new();
    fields.insert("ratings".to_string(), json!(ratings));
    fields.insert("average_rating".to_string(), json!(summary.average_rating));
    store
        .merge(&collection("inventory").doc(product_id), fields)
        .await?;
    Ok(())
}

pub async fn get_traceability<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<TraceabilityRecord>> {
    let path = traceability_path(&query.product_id);
    let traceability_data = ctx
        .store
        .get(&path)
        .await?
        .ok_or_else(|| ApiError::not_found("Traceability data not found"))?;
    let documents = decode_all(ctx.store.list(&path.sub("documents")).await?, "document_id");

    Ok(Json(TraceabilityRecord {
        traceability_data,
        documents,
    }))
}

pub async fn scan_code<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<TraceabilityScanRequest>,
) -> ApiResult<(StatusCode, Json<TraceabilityScan>)> {
    let scan = TraceabilityScan {
        scan_id: generate_push_id(),
        code_type: request.code_type,
        code_value: request.code_value,
        user_id: user.user_id.clone(),
        scanned_at: now_rfc3339(),
    };
    ctx.store
        .set(&collection("traceability_scans").doc(&scan.scan_id), to_document(&scan)?)
        .await?;
    Ok((StatusCode::CREATED, Json(scan)))
}

pub async fn register_document<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<TraceabilityDocumentRequest>,
) -> ApiResult<(StatusCode, Json<TraceabilityDocument>)> {
    if !(request.document_url.starts_with("http://") || request.document_url.starts_with("https://")) {
        return Err(ApiError::bad_request("document_url must be an http(s) URL"));
    }

    let document = TraceabilityDocument {
        document_id: generate_push_id(),
        document_type: request.document_type,
        document_url: request.document_url,
        uploaded_by: user.user_id.clone(),
        uploaded_at: now_rfc3339(),
    };
    let path = traceability_path(&request.product_id)
        .sub("documents")
        .doc(&document.document_id);
    ctx.store.set(&path, to_document(&document)?).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list_reviews<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<ListResponse<Review>>> {
    let reviews = product_reviews(ctx.store.as_ref(), &query.product_id).await?;
    Ok(Json(ListResponse::new(reviews)))
}

pub async fn submit_review<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    if !user.is(&request.user_id) {
        return Err(ApiError::forbidden("Unauthorized user ID"));
    }
    validate_rating(request.rating)?;

    let review = Review {
        review_id: generate_push_id(),
        product_id: request.product_id,
        rating: request.rating,
        comment: request.comment,
        user_id: request.user_id,
        created_at: Some(now_rfc3339()),
        status: None,
        moderator_reason: None,
    };
    ctx.store
        .set(&reviews(&review.product_id).doc(&review.review_id), to_document(&review)?)
        .await?;
    refresh_listing_rating(ctx.store.as_ref(), &review.product_id).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn review_summary<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<ReviewSummary>> {
    let ratings: Vec<u8> = product_reviews(ctx.store.as_ref(), &query.product_id)
        .await?
        .iter()
        .map(|review| review.rating)
        .collect();
    Ok(Json(ReviewSummary::from_ratings(&ratings)))
}

pub async fn edit_review<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(review_id): ApiPath<Id>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> ApiResult<Json<Review>> {
    validate_rating(request.rating)?;
    let product_id = request.product_id.clone();
    let id = review_id.clone();
    let review = ctx
        .store
        .modify(&reviews(&product_id).doc(&review_id), move |current| {
            let mut review: Review = existing(current, &id, "review_id", "Review")?;
            if !user.is(&review.user_id) {
                return Err(ApiError::forbidden("Unauthorized to edit this review").into());
            }
            review.rating = request.rating;
            review.comment = request.comment;
            Ok((Some(serde_json::to_value(&review)?), review))
        })
        .await?;
    refresh_listing_rating(ctx.store.as_ref(), &product_id).await?;
    Ok(Json(review))
}

pub async fn delete_review<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(review_id): ApiPath<Id>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let id = review_id.clone();
    ctx.store
        .modify(&reviews(&query.product_id).doc(&review_id), move |current| {
            let review: Review = existing(current, &id, "review_id", "Review")?;
            if !user.is(&review.user_id) {
                return Err(ApiError::forbidden("Unauthorized to delete this review").into());
            }
            Ok((None, ()))
        })
        .await?;
    refresh_listing_rating(ctx.store.as_ref(), &query.product_id).await?;
    Ok(message("Review deleted successfully."))
}

pub async fn user_reviews<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(user_id): ApiPath<String>,
) -> ApiResult<Json<ListResponse<Review>>> {
    if !user.is(&user_id) {
        return Err(ApiError::forbidden("Unauthorized access to this user's reviews"));
    }
    // Partner reviews share the collection name but carry no product_id
    let documents = ctx
        .store
        .collection_group("reviews")
        .await?
        .into_iter()
        .filter(|doc| doc.field("product_id").is_some() && doc.field("user_id") == Some(&json!(user_id)))
        .collect();
    Ok(Json(ListResponse::new(decode_all(documents, "review_id"))))
}

pub async fn moderate_review<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ModerateReviewRequest>,
) -> ApiResult<Json<Value>> {
    require_moderator(&user)?;

    let status = request.action.resulting_status();
    let id = request.review_id.clone();
    let review = ctx
        .store
        .modify(&reviews(&request.product_id).doc(&request.review_id), move |current| {
            let mut review: Review = existing(current, &id, "review_id", "Review")?;
            review.status = Some(status);
            if request.reason.is_some() {
                review.moderator_reason = request.reason;
            }
            Ok((Some(serde_json::to_value(&review)?), review))
        })
        .await?;

    log::info!("Moderator {} set review {} to {:?}", user.user_id, review.review_id, status);
    Ok(Json(json!({"message": "Moderation action applied successfully", "review": review})))
}
