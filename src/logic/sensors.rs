use crate::model::{SensorDiagnostics, SensorMetric, SensorReading, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breach {
    pub metric: SensorMetric,
    pub value: f64,
    pub threshold: f64,
}

impl Thresholds {
    /// Every metric of `reading` strictly above its threshold
    pub fn breaches(&self, reading: &SensorReading) -> Vec<Breach> {
        [
            (SensorMetric::Temperature, reading.temperature, self.temperature_threshold),
            (SensorMetric::Humidity, reading.humidity, self.humidity_threshold),
            (SensorMetric::SoilMoisture, reading.soil_moisture, self.soil_moisture_threshold),
        ]
        .into_iter()
        .filter(|(_, value, threshold)| value > threshold)
        .map(|(metric, value, threshold)| Breach {
            metric,
            value,
            threshold,
        })
        .collect()
    }
}

/// Averages over all readings; `None` when there are no readings
pub fn diagnostics(readings: &[SensorReading]) -> Option<SensorDiagnostics> {
    if readings.is_empty() {
        return None;
    }

    let count = readings.len() as f64;
    let sum = |metric: fn(&SensorReading) -> f64| readings.iter().map(metric).sum::<f64>();

    Some(SensorDiagnostics {
        average_temperature: sum(|r| r.temperature) / count,
        average_humidity: sum(|r| r.humidity) / count,
        average_soil_moisture: sum(|r| r.soil_moisture) / count,
        active_sensors: readings
            .iter()
            .filter(|r| r.status.as_deref() == Some("active"))
            .count(),
        total_sensors: readings.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, humidity: f64, soil_moisture: f64, status: Option<&str>) -> SensorReading {
        SensorReading {
            user_id: "farmer-1".to_string(),
            temperature,
            humidity,
            soil_moisture,
            timestamp: "2024-05-01T06:00:00Z".to_string(),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_breaches_are_strictly_above_threshold() {
        let thresholds = Thresholds {
            temperature_threshold: 35.0,
            humidity_threshold: 80.0,
            soil_moisture_threshold: 40.0,
        };

        let breaches = thresholds.breaches(&reading(38.5, 80.0, 45.0, None));
        assert_eq!(breaches.len(), 2);
        assert_eq!(breaches[0].metric, SensorMetric::Temperature);
        assert_eq!(breaches[1].metric, SensorMetric::SoilMoisture);
        assert_eq!(breaches[1].threshold, 40.0);

        assert!(thresholds.breaches(&reading(20.0, 50.0, 30.0, None)).is_empty());
    }

    #[test]
    fn test_diagnostics() {
        assert_eq!(diagnostics(&[]), None);

        let result = diagnostics(&[
            reading(30.0, 60.0, 20.0, Some("active")),
            reading(20.0, 40.0, 40.0, None),
        ])
        .unwrap();
        assert_eq!(result.average_temperature, 25.0);
        assert_eq!(result.average_humidity, 50.0);
        assert_eq!(result.average_soil_moisture, 30.0);
        assert_eq!(result.active_sensors, 1);
        assert_eq!(result.total_sensors, 2);
    }
}
