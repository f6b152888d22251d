use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{decode_all, existing, message, to_document, AppState, ListResponse, MessageResponse};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::logic::diagnostics;
use crate::model::{
    generate_push_id, now_rfc3339, AcknowledgeAlert, Id, SensorAlert, SensorConfig, SensorData,
    SensorDiagnostics, SensorReading, SensorThresholdsRequest, Thresholds, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn sensor_doc(sensor_id: &str) -> DocPath {
    collection("sensors_data").doc(sensor_id)
}

fn sensor_thresholds_path(sensor_id: &str) -> DocPath {
    sensor_doc(sensor_id).sub("config").doc("thresholds")
}

fn sensor_status_path(sensor_id: &str) -> DocPath {
    sensor_doc(sensor_id).sub("status").doc("current_status")
}

fn global_thresholds_path() -> DocPath {
    collection("sensor_global_config").doc("thresholds")
}

fn alerts() -> CollectionPath {
    collection("sensor_alerts")
}

/// Per-sensor thresholds, falling back to the global ones
async fn thresholds_for<S: Store>(store: &S, sensor_id: &str) -> ApiResult<Option<Thresholds>> {
    for path in [sensor_thresholds_path(sensor_id), global_thresholds_path()] {
        if let Some(data) = store.get(&path).await? {
            return Ok(Some(serde_json::from_value(data)?));
        }
    }
    Ok(None)
}

pub async fn submit_sensor_data<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(data): ApiJson<SensorData>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let reading = SensorReading::from_data(&data, &user.user_id);
    let reading_id = ctx
        .store
        .add(&sensor_doc(&data.sensor_id).sub("readings"), to_document(&reading)?)
        .await?;

    ctx.store
        .set(
            &sensor_status_path(&data.sensor_id),
            json!({
                "status": reading.status.clone().unwrap_or_else(|| "active".to_string()),
                "last_reading_id": reading_id,
                "last_reading_at": reading.timestamp,
            }),
        )
        .await?;

    let mut raised = Vec::new();
    if let Some(thresholds) = thresholds_for(ctx.store.as_ref(), &data.sensor_id).await? {
        for breach in thresholds.breaches(&reading) {
            let alert = SensorAlert {
                alert_id: generate_push_id(),
                sensor_id: data.sensor_id.clone(),
                user_id: user.user_id.clone(),
                metric: breach.metric,
                value: breach.value,
                threshold: breach.threshold,
                timestamp: now_rfc3339(),
                acknowledged: false,
                acknowledged_timestamp: None,
            };
            ctx.store
                .set(&alerts().doc(&alert.alert_id), to_document(&alert)?)
                .await?;
            log::warn!(
                "Sensor {} {:?} reading {} exceeds threshold {}",
                alert.sensor_id,
                alert.metric,
                alert.value,
                alert.threshold
            );
            raised.push(alert);
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Sensor data recorded.",
            "reading_id": reading_id,
            "alerts": raised,
        })),
    ))
}

pub async fn get_sensor_data<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(sensor_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<SensorReading>>> {
    let documents = ctx.store.list(&sensor_doc(&sensor_id).sub("readings")).await?;
    let readings: Vec<SensorReading> = decode_all(documents, "reading_id");
    if readings.is_empty() {
        return Err(ApiError::not_found("No data found for this sensor."));
    }
    Ok(Json(ListResponse::new(readings)))
}

pub async fn get_alerts<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<ListResponse<SensorAlert>>> {
    let documents = ctx
        .store
        .find_by_field(&alerts(), "user_id", &json!(user.user_id))
        .await?;
    Ok(Json(ListResponse::new(decode_all(documents, "alert_id"))))
}

pub async fn acknowledge_alert<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<AcknowledgeAlert>,
) -> ApiResult<Json<SensorAlert>> {
    let caller = user.user_id.clone();
    let now = now_rfc3339();
    let alert_id = request.alert_id.clone();

    let alert = ctx
        .store
        .modify(&alerts().doc(&request.alert_id), move |current| {
            let mut alert: SensorAlert = existing(current, &alert_id, "alert_id", "Alert")?;
            if alert.user_id != caller {
                return Err(ApiError::forbidden("This alert belongs to another user").into());
            }
            alert.acknowledged = request.acknowledged;
            alert.acknowledged_timestamp = request.acknowledged.then_some(now);
            Ok((Some(serde_json::to_value(&alert)?), alert))
        })
        .await?;
    Ok(Json(alert))
}

pub async fn update_sensor_config<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(sensor_id): ApiPath<Id>,
    ApiJson(config): ApiJson<SensorConfig>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.store
        .set(&sensor_doc(&sensor_id).sub("config").doc("settings"), to_document(&config)?)
        .await?;
    log::info!("Sensor {} configuration updated by {}", sensor_id, user.user_id);
    Ok(message("Sensor configuration updated successfully."))
}

pub async fn get_sensor_status<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(sensor_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let status = ctx
        .store
        .get(&sensor_status_path(&sensor_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Sensor status not found."))?;
    Ok(Json(json!({"sensor_id": sensor_id, "status": status})))
}

pub async fn set_thresholds<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<SensorThresholdsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let thresholds = Thresholds {
        temperature_threshold: request.temperature_threshold,
        humidity_threshold: request.humidity_threshold,
        soil_moisture_threshold: request.soil_moisture_threshold,
    };
    let path = match request.sensor_id.as_deref() {
        Some(sensor_id) => sensor_thresholds_path(sensor_id),
        None => global_thresholds_path(),
    };
    ctx.store.set(&path, to_document(&thresholds)?).await?;
    log::info!("Thresholds at {} set by {}", path, user.user_id);
    Ok(message("Sensor thresholds updated successfully."))
}

pub async fn get_diagnostics<S: Store>(
    State(ctx): State<AppState<S>>,
) -> ApiResult<Json<SensorDiagnostics>> {
    let readings: Vec<SensorReading> = decode_all(ctx.store.collection_group("readings").await?, "reading_id");
    diagnostics(&readings)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No sensor data available."))
}
