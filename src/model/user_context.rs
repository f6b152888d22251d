use serde::{Deserialize, Serialize};

/// Caller identity forwarded by the upstream auth gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserContext {
    /// Create a new UserContext with just a user ID
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            user_email: None,
            user_name: None,
            roles: Vec::new(),
        }
    }

    /// Create a UserContext with full user information
    pub fn with_details(user_id: String, email: Option<String>, name: Option<String>) -> Self {
        Self {
            user_id,
            user_email: email,
            user_name: name,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    /// Admins may do everything moderators may do
    pub fn is_moderator(&self) -> bool {
        self.is_admin() || self.has_role("moderator")
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
