use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

static LAST_PUSH_MICROS: AtomicI64 = AtomicI64::new(0);

/// Time-ordered document id: 14 hex digits of microseconds since the epoch
/// followed by a random suffix. Ids generated by one process are strictly
/// increasing, so lexicographic order is creation order.
pub fn generate_push_id() -> Id {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_PUSH_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    let micros = now.max(previous + 1);

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{:014x}{}", micros, &suffix[..10])
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Decode a stored document into a typed model, injecting the document id
/// under `id_field` so models can carry their own key.
pub fn decode_document<T: DeserializeOwned>(
    id: &str,
    id_field: &str,
    mut data: Value,
) -> serde_json::Result<T> {
    if let Value::Object(map) = &mut data {
        map.insert(id_field.to_string(), Value::String(id.to_string()));
    }
    serde_json::from_value(data)
}
