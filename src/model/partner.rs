use serde::{Deserialize, Serialize};

use super::common::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerType {
    Retail,
    ColdStorage,
    Transport,
}

/// Document in `partners`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    #[serde(default)]
    pub partner_id: Id,
    #[serde(rename = "type")]
    pub partner_type: PartnerType,
    pub name: String,
    pub location: String,
    pub contact_info: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailPartnerRequest {
    pub name: String,
    pub location: String,
    pub contact_info: String,
    pub business_type: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColdStoragePartnerRequest {
    pub name: String,
    pub location: String,
    pub capacity: u64,
    pub contact_info: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportPartnerRequest {
    pub name: String,
    pub location: String,
    pub fleet_size: u64,
    pub contact_info: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePartnerDetails {
    pub partner_id: Id,
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub business_type: Option<String>,
    pub rating: Option<f64>,
    pub capacity: Option<u64>,
    pub fleet_size: Option<u64>,
}

impl UpdatePartnerDetails {
    pub fn apply_to(self, partner: &mut Partner) {
        if let Some(name) = self.name {
            partner.name = name;
        }
        if let Some(location) = self.location {
            partner.location = location;
        }
        if let Some(contact_info) = self.contact_info {
            partner.contact_info = contact_info;
        }
        if self.business_type.is_some() {
            partner.business_type = self.business_type;
        }
        if self.rating.is_some() {
            partner.rating = self.rating;
        }
        if self.capacity.is_some() {
            partner.capacity = self.capacity;
        }
        if self.fleet_size.is_some() {
            partner.fleet_size = self.fleet_size;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerSearchParams {
    pub location: Option<String>,
    pub partner_type: Option<PartnerType>,
    pub min_rating: Option<f64>,
}

impl PartnerSearchParams {
    pub fn matches(&self, partner: &Partner) -> bool {
        if let Some(location) = &self.location {
            if &partner.location != location {
                return false;
            }
        }
        if let Some(partner_type) = self.partner_type {
            if partner.partner_type != partner_type {
                return false;
            }
        }
        match self.min_rating {
            Some(min) if min > 0.0 => partner.rating.map_or(false, |rating| rating >= min),
            _ => true,
        }
    }
}

/// Document `cold_storage_capacity/{partner_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColdStorageCapacity {
    pub total_capacity: f64,
    pub current_utilization: f64,
}

impl ColdStorageCapacity {
    pub fn utilization_rate(&self) -> f64 {
        if self.total_capacity <= 0.0 {
            return 0.0;
        }
        self.current_utilization / self.total_capacity * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(partner_type: PartnerType, rating: Option<f64>) -> Partner {
        Partner {
            partner_id: "p1".to_string(),
            partner_type,
            name: "Cool Co".to_string(),
            location: "Pune".to_string(),
            contact_info: "+91 9999999999".to_string(),
            user_id: "u1".to_string(),
            business_type: None,
            rating,
            capacity: None,
            fleet_size: None,
            created_at: None,
        }
    }

    #[test]
    fn test_search_filters() {
        let params = PartnerSearchParams {
            location: Some("Pune".to_string()),
            partner_type: Some(PartnerType::ColdStorage),
            min_rating: Some(4.0),
        };
        assert!(params.matches(&partner(PartnerType::ColdStorage, Some(4.5))));
        assert!(!params.matches(&partner(PartnerType::ColdStorage, Some(3.9))));
        assert!(!params.matches(&partner(PartnerType::ColdStorage, None)));
        assert!(!params.matches(&partner(PartnerType::Retail, Some(5.0))));
    }

    #[test]
    fn test_type_wire_names() {
        assert_eq!(
            serde_json::to_value(PartnerType::ColdStorage).unwrap(),
            serde_json::json!("cold-storage")
        );
    }

    #[test]
    fn test_utilization_rate() {
        let capacity = ColdStorageCapacity {
            total_capacity: 200.0,
            current_utilization: 50.0,
        };
        assert!((capacity.utilization_rate() - 25.0).abs() < f64::EPSILON);
    }
}
