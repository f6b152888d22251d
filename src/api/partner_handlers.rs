use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, load, to_document, with_ids, AppState, ListResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, ColdStorageCapacity, ColdStoragePartnerRequest, Id, Partner,
    PartnerSearchParams, PartnerType, RetailPartnerRequest, TransportPartnerRequest,
    UpdatePartnerDetails, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn partners() -> CollectionPath {
    collection("partners")
}

fn partner_path(partner_id: &str) -> DocPath {
    partners().doc(partner_id)
}

async fn partners_of_type<S: Store>(store: &S, partner_type: PartnerType) -> ApiResult<Vec<Partner>> {
    let documents = store
        .find_by_field(&partners(), "type", &serde_json::to_value(partner_type)?)
        .await?;
    Ok(decode_all(documents, "partner_id"))
}

fn new_partner(partner_type: PartnerType, name: String, location: String, contact_info: String, user: &UserContext) -> Partner {
    Partner {
        partner_id: generate_push_id(),
        partner_type,
        name,
        location,
        contact_info,
        user_id: user.user_id.clone(),
        business_type: None,
        rating: None,
        capacity: None,
        fleet_size: None,
        created_at: Some(now_rfc3339()),
    }
}

async fn save_partner<S: Store>(store: &S, partner: Partner) -> ApiResult<(StatusCode, Json<Partner>)> {
    store
        .set(&partner_path(&partner.partner_id), to_document(&partner)?)
        .await?;
    log::info!("Registered {:?} partner {} ({})", partner.partner_type, partner.partner_id, partner.name);
    Ok((StatusCode::CREATED, Json(partner)))
}

pub async fn list_retail_partners<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Partner>>> {
    Ok(Json(ListResponse::new(partners_of_type(ctx.store.as_ref(), PartnerType::Retail).await?)))
}

pub async fn create_retail_partner<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<RetailPartnerRequest>,
) -> ApiResult<(StatusCode, Json<Partner>)> {
    if !(0.0..=5.0).contains(&request.rating) {
        return Err(ApiError::bad_request("Rating must be between 0 and 5"));
    }
    let mut partner = new_partner(PartnerType::Retail, request.name, request.location, request.contact_info, &user);
    partner.business_type = Some(request.business_type);
    partner.rating = Some(request.rating);
    save_partner(ctx.store.as_ref(), partner).await
}

pub async fn list_cold_storage_partners<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Partner>>> {
    Ok(Json(ListResponse::new(partners_of_type(ctx.store.as_ref(), PartnerType::ColdStorage).await?)))
}

pub async fn create_cold_storage_partner<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ColdStoragePartnerRequest>,
) -> ApiResult<(StatusCode, Json<Partner>)> {
    let mut partner = new_partner(PartnerType::ColdStorage, request.name, request.location, request.contact_info, &user);
    partner.capacity = Some(request.capacity);
    save_partner(ctx.store.as_ref(), partner).await
}

pub async fn list_transport_partners<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Partner>>> {
    Ok(Json(ListResponse::new(partners_of_type(ctx.store.as_ref(), PartnerType::Transport).await?)))
}

pub async fn create_transport_partner<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<TransportPartnerRequest>,
) -> ApiResult<(StatusCode, Json<Partner>)> {
    let mut partner = new_partner(PartnerType::Transport, request.name, request.location, request.contact_info, &user);
    partner.fleet_size = Some(request.fleet_size);
    save_partner(ctx.store.as_ref(), partner).await
}

pub async fn update_partner<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(update): ApiJson<UpdatePartnerDetails>,
) -> ApiResult<Json<Partner>> {
    let id = update.partner_id.clone();
    let path = partner_path(&update.partner_id);
    let partner = ctx
        .store
        .modify(&path, move |current| {
            let mut partner: Partner = existing(current, &id, "partner_id", "Partner")?;
            if !user.is(&partner.user_id) && !user.is_admin() {
                return Err(ApiError::forbidden("Only the partner's owner can update it").into());
            }
            update.apply_to(&mut partner);
            Ok((Some(serde_json::to_value(&partner)?), partner))
        })
        .await?;
    Ok(Json(partner))
}

pub async fn partner_reviews<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(partner_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<Value>>> {
    let path = partner_path(&partner_id);
    load::<S, Partner>(ctx.store.as_ref(), &path, "partner_id", "Partner").await?;
    let documents = ctx.store.list(&path.sub("reviews")).await?;
    Ok(Json(ListResponse::new(with_ids(documents, "review_id"))))
}

pub async fn search_partners<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(params): ApiQuery<PartnerSearchParams>,
) -> ApiResult<Json<ListResponse<Partner>>> {
    let found: Vec<Partner> = decode_all::<Partner>(ctx.store.list(&partners()).await?, "partner_id")
        .into_iter()
        .filter(|partner| params.matches(partner))
        .collect();
    Ok(Json(ListResponse::new(found)))
}

pub async fn partner_analytics<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(partner_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let partner: Partner = load(ctx.store.as_ref(), &partner_path(&partner_id), "partner_id", "Partner").await?;

    match partner.partner_type {
        PartnerType::Transport => {
            let deliveries = ctx
                .store
                .find_by_field(&collection("deliveries"), "partner_id", &json!(partner_id))
                .await?;
            Ok(Json(json!({"partner_id": partner_id, "num_deliveries": deliveries.len()})))
        }
        PartnerType::ColdStorage => {
            let capacity: ColdStorageCapacity = load(
                ctx.store.as_ref(),
                &collection("cold_storage_capacity").doc(&partner_id),
                "partner_id",
                "Cold storage capacity data",
            )
            .await?;
            Ok(Json(json!({
                "partner_id": partner_id,
                "total_capacity": capacity.total_capacity,
                "current_utilization": capacity.current_utilization,
                "utilization_rate": capacity.utilization_rate(),
            })))
        }
        PartnerType::Retail => Err(ApiError::bad_request(
            "Analytics are only available for transport and cold-storage partners",
        )),
    }
}
