use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventorySyncAction {
    Add,
    Edit,
    Remove,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventorySyncItem {
    pub item_id: Id,
    pub action: InventorySyncAction,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncInventoryRequest {
    pub items: Vec<InventorySyncItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageSyncItem {
    pub conversation_id: Id,
    pub message_id: Id,
    pub sender_id: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncChatRequest {
    pub messages: Vec<ChatMessageSyncItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSyncAction {
    Add,
    Update,
    Cancel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderSyncItem {
    pub order_id: Id,
    pub action: OrderSyncAction,
    pub order_status: String,
    #[serde(default)]
    pub items: Vec<Value>,
    pub delivery_address: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncOrderRequest {
    pub orders: Vec<OrderSyncItem>,
}

/// Document `user_settings/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettingsSync {
    pub user_id: String,
    /// e.g. `en`, `hi`
    pub language: String,
    pub notifications_enabled: bool,
    /// `dark` or `light`
    pub theme: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionAction {
    Overwrite,
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConflictResolution {
    pub document_id: Id,
    pub field_name: String,
    pub local_value: String,
    #[serde(default)]
    pub server_value: Option<String>,
    pub resolution_action: ResolutionAction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncAsset {
    pub asset_name: String,
    pub asset_url: String,
}

/// Document `user_sync_status/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    pub status: String,
    pub last_synced: Option<String>,
}

impl SyncStatus {
    pub fn synced(now: String) -> Self {
        Self {
            status: "synced".to_string(),
            last_synced: Some(now),
        }
    }
}
