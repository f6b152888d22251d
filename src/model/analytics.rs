use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserEngagement {
    pub total_users: usize,
    pub active_users: usize,
    pub inactive_users: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesReport {
    pub total_sales: f64,
    pub total_transactions: usize,
    pub avg_order_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemUsage {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub total_errors: usize,
}

/// Optional paging for the sales report; without `page` the whole
/// `transactions` collection is summed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesPageParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub const DEFAULT_SALES_PAGE_LIMIT: usize = 10;
