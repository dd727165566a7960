//! A study group ("party") and its roster.

use crate::{party_members, Id};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,

    pub name: String,

    pub organizer_id: Id,

    #[serde(default)]
    pub members: Vec<party_members::Model>,
}

impl Model {
    pub fn member(&self, user_id: Id) -> Option<&party_members::Model> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}
