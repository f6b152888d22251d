use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-submitted log record, stored in `logs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogData {
    pub user_id: String,
    /// `error`, `event`, ...
    pub log_type: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogPageParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub collection: String,
    pub data: Value,
}
