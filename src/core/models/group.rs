use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub is_active: bool,
}

impl Member {
    pub fn active(name: impl Into<String>) -> Self {
        Member {
            name: name.into(),
            is_active: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Names of active members, in membership order.
    pub fn active_members(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.name.clone())
            .collect()
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn find_member_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.name == name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.find_member(name).is_some()
    }
}
