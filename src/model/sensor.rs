use serde::{Deserialize, Serialize};

use super::common::Id;

#[derive(Debug, Clone, Deserialize)]
pub struct SensorData {
    pub sensor_id: Id,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    /// ISO 8601 timestamp reported by the device
    pub timestamp: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Document in `sensors_data/{sensor}/readings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub soil_moisture: f64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SensorReading {
    pub fn from_data(data: &SensorData, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            temperature: data.temperature,
            humidity: data.humidity,
            soil_moisture: data.soil_moisture,
            timestamp: data.timestamp.clone(),
            status: data.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub threshold_temperature: f64,
    pub threshold_humidity: f64,
    pub threshold_soil_moisture: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorThresholdsRequest {
    pub temperature_threshold: f64,
    pub humidity_threshold: f64,
    pub soil_moisture_threshold: f64,
    /// Per-sensor thresholds when set, global thresholds otherwise
    pub sensor_id: Option<Id>,
}

/// Stored at `sensors_data/{sensor}/config/thresholds` or `sensor_global_config/thresholds`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub temperature_threshold: f64,
    pub humidity_threshold: f64,
    pub soil_moisture_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMetric {
    Temperature,
    Humidity,
    SoilMoisture,
}

/// Document in `sensor_alerts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorAlert {
    #[serde(default)]
    pub alert_id: Id,
    pub sensor_id: Id,
    pub user_id: String,
    pub metric: SensorMetric,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: String,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcknowledgeAlert {
    pub alert_id: Id,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDiagnostics {
    pub average_temperature: f64,
    pub average_humidity: f64,
    pub average_soil_moisture: f64,
    pub active_sensors: usize,
    pub total_sensors: usize,
}
