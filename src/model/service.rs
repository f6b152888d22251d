use serde::{Deserialize, Serialize};

use super::common::Id;
use super::user_context::UserContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Active,
    Inactive,
}

/// Document in `cold_storage_services`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColdStorageService {
    #[serde(default)]
    pub service_id: Id,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Smallest booking accepted, in kg
    #[serde(default)]
    pub minimum_quantity: f64,
    #[serde(default)]
    pub areas_served: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub status: ServiceStatus,
    pub owner_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ColdStorageService {
    pub fn editable_by(&self, user: &UserContext) -> bool {
        user.is(&self.owner_id) || user.is_admin()
    }
}

/// Body of create and update; an update replaces every listed field
#[derive(Debug, Clone, Deserialize)]
pub struct ColdStorageServiceRequest {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub minimum_quantity: f64,
    #[serde(default)]
    pub areas_served: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub status: ServiceStatus,
}

impl ColdStorageServiceRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("address is required".to_string());
        }
        if self.phone_number.trim().is_empty() {
            return Err("phone_number is required".to_string());
        }
        if !self.minimum_quantity.is_finite() || self.minimum_quantity < 0.0 {
            return Err("minimum_quantity cannot be negative".to_string());
        }
        Ok(())
    }

    pub fn into_service(self, service_id: Id, owner_id: String, now: String) -> ColdStorageService {
        ColdStorageService {
            service_id,
            name: self.name,
            address: self.address,
            phone_number: self.phone_number,
            email: self.email,
            website: self.website,
            description: self.description,
            minimum_quantity: self.minimum_quantity,
            areas_served: self.areas_served,
            payment_methods: self.payment_methods,
            rating: 0.0,
            status: self.status,
            owner_id,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        }
    }

    /// Replace the editable fields, keeping id, owner, rating and creation time
    pub fn apply_to(self, service: &mut ColdStorageService, now: String) {
        let created_at = service.created_at.take();
        let rating = service.rating;
        *service = self.into_service(
            std::mem::take(&mut service.service_id),
            std::mem::take(&mut service.owner_id),
            now,
        );
        service.rating = rating;
        service.created_at = created_at;
    }
}
