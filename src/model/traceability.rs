use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Id;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductQuery {
    pub product_id: Id,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceabilityRecord {
    pub traceability_data: Value,
    pub documents: Vec<TraceabilityDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceabilityScanRequest {
    /// QR, Barcode, ...
    pub code_type: String,
    pub code_value: String,
}

/// Document in `traceability_scans`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceabilityScan {
    #[serde(default)]
    pub scan_id: Id,
    pub code_type: String,
    pub code_value: String,
    pub user_id: String,
    pub scanned_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceabilityDocumentRequest {
    pub product_id: Id,
    /// Invoice, Certificate, ...
    pub document_type: String,
    pub document_url: String,
}

/// Document in `traceability/{pid}/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceabilityDocument {
    #[serde(default)]
    pub document_id: Id,
    pub document_type: String,
    pub document_url: String,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Rejected,
    Flagged,
}

/// Document in `products/{pid}/reviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub review_id: Id,
    pub product_id: Id,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub product_id: Id,
    pub rating: u8,
    pub comment: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewModerationAction {
    Approve,
    Reject,
    Flag,
}

impl ReviewModerationAction {
    pub fn resulting_status(&self) -> ReviewStatus {
        match self {
            ReviewModerationAction::Approve => ReviewStatus::Approved,
            ReviewModerationAction::Reject => ReviewStatus::Rejected,
            ReviewModerationAction::Flag => ReviewStatus::Flagged,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerateReviewRequest {
    pub product_id: Id,
    pub review_id: Id,
    pub action: ReviewModerationAction,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub total_reviews: usize,
}

impl ReviewSummary {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self {
                average_rating: 0.0,
                total_reviews: 0,
            };
        }
        let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
        Self {
            average_rating: sum / ratings.len() as f64,
            total_reviews: ratings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        assert_eq!(
            ReviewSummary::from_ratings(&[]),
            ReviewSummary { average_rating: 0.0, total_reviews: 0 }
        );
        let summary = ReviewSummary::from_ratings(&[5, 4, 3]);
        assert_eq!(summary.total_reviews, 3);
        assert!((summary.average_rating - 4.0).abs() < f64::EPSILON);
    }
}
