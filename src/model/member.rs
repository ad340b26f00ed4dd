use serde::{Deserialize, Serialize};

use super::task::Assignee;

/// Entry of the team directory (`GET /users/`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

impl TeamMember {
    /// The reference stored on a task when this member is assigned
    pub fn as_assignee(&self) -> Assignee {
        Assignee {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
