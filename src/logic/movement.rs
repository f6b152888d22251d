use chrono::DateTime;

use crate::model::{MovementAnalytics, MovementTracking};

pub fn is_delivered(movement: &MovementTracking) -> bool {
    movement.status.eq_ignore_ascii_case("delivered")
}

fn delivery_hours(movement: &MovementTracking) -> Option<f64> {
    let dispatched = DateTime::parse_from_rfc3339(&movement.timestamp).ok()?;
    let delivered = DateTime::parse_from_rfc3339(movement.delivered_at.as_deref()?).ok()?;
    let seconds = (delivered - dispatched).num_seconds();
    (seconds >= 0).then(|| seconds as f64 / 3600.0)
}

/// Delivered count plus the mean dispatch-to-delivery time in hours.
/// Deliveries with missing or unparsable timestamps count towards the
/// total but not towards the average.
pub fn movement_analytics(movements: &[MovementTracking]) -> MovementAnalytics {
    let delivered: Vec<&MovementTracking> = movements.iter().filter(|m| is_delivered(m)).collect();
    let durations: Vec<f64> = delivered.iter().filter_map(|m| delivery_hours(m)).collect();

    let average_delivery_time = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    MovementAnalytics {
        average_delivery_time,
        total_deliveries: delivered.len(),
    }
}
