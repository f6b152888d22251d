use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub age: Option<u8>,
    /// `+91` followed by 10 digits
    pub phone_number: String,
    pub occupation: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Six digit postal code
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
    pub description: Option<String>,
}

/// Document `users/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub uid: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub age: Option<u8>,
    pub phone_number: String,
    pub occupation: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
}

pub fn is_valid_phone_number(phone: &str) -> bool {
    phone
        .strip_prefix("+91")
        .map_or(false, |rest| rest.len() == 10 && rest.bytes().all(|b| b.is_ascii_digit()))
}

pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

impl ProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_phone_number(&self.phone_number) {
            return Err("phone_number must be +91 followed by 10 digits".to_string());
        }
        if let Some(pincode) = &self.pincode {
            if !is_valid_pincode(pincode) {
                return Err("pincode must be 6 digits".to_string());
            }
        }
        Ok(())
    }

    pub fn into_profile(self, uid: String, email: Option<String>, now: String) -> Profile {
        Profile {
            uid,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            age: self.age,
            phone_number: self.phone_number,
            occupation: self.occupation,
            role: self.role,
            address: self.address,
            state: self.state,
            city: self.city,
            pincode: self.pincode,
            profile_image: self.profile_image,
            description: self.description,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_format() {
        assert!(is_valid_phone_number("+919876543210"));
        assert!(!is_valid_phone_number("9876543210"));
        assert!(!is_valid_phone_number("+91987654321"));
        assert!(!is_valid_phone_number("+91987654321x"));
    }

    #[test]
    fn test_pincode_format() {
        assert!(is_valid_pincode("201305"));
        assert!(!is_valid_pincode("2013"));
        assert!(!is_valid_pincode("20130a"));
    }
}
