use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::common::Id;

/// Document `groups/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub group_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Group {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// Member list with the creator included and duplicates removed, first occurrence wins
    pub fn normalized_members(creator: &str, members: Vec<String>) -> Vec<String> {
        members
            .into_iter()
            .chain(std::iter::once(creator.to_string()))
            .unique()
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub member_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInviteRequest {
    pub email: String,
}

/// Document in `groups/{id}/invites`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInvite {
    #[serde(default)]
    pub invite_id: Id,
    pub email: String,
    pub invited_by: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMessageRequest {
    pub message: String,
}

/// Document in `groups/{id}/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMessage {
    #[serde(default)]
    pub message_id: Id,
    pub sender_id: String,
    pub message: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_is_member_once() {
        let members = Group::normalized_members(
            "u1",
            vec!["u2".to_string(), "u1".to_string(), "u2".to_string()],
        );
        assert_eq!(members, vec!["u2".to_string(), "u1".to_string()]);

        let members = Group::normalized_members("u1", Vec::new());
        assert_eq!(members, vec!["u1".to_string()]);
    }
}
