//! A party member as seen by meeting reconciliation.

use crate::Id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub user_id: Id,

    pub username: String,

    pub first_name: String,

    pub last_name: String,

    pub email: String,
}

/// Lowercases and trims a lookup key. Matching is exact on the result.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn username_key(&self) -> String {
        normalize(&self.username)
    }

    pub fn full_name_key(&self) -> String {
        normalize(&self.full_name())
    }

    pub fn email_key(&self) -> String {
        normalize(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_keys_are_trimmed_and_lowercased() {
        let member = Model {
            user_id: Id::new_v4(),
            username: "  MathWiz ".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "Ada@Example.COM ".to_string(),
        };

        assert_eq!(member.username_key(), "mathwiz");
        assert_eq!(member.full_name_key(), "ada lovelace");
        assert_eq!(member.email_key(), "ada@example.com");
    }
}
