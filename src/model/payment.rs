use serde::{Deserialize, Serialize};

use super::common::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Paid,
}

/// Document `payments/{order_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub order_id: Id,
    pub user_id: String,
    /// Amount in the smallest currency unit (paise for INR)
    pub amount: u64,
    pub currency: String,
    pub receipt_id: String,
    pub status: PaymentStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub receipt_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: String,
    pub order_id: Id,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatusQuery {
    pub order_id: Id,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationTokenRequest {
    /// e.g. `razorpay`, `stripe`
    pub provider: String,
    pub token: String,
}
