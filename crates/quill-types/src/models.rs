use serde::{Deserialize, Serialize};

/// A registered account as exposed outside the database layer.
/// The password hash never leaves `quill-db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub username: String,
}

impl Feedback {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.username == username
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_without_password() {
        let user = User {
            username: "ann".into(),
            email: "ann@example.com".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(user.full_name(), "Ann Lee");
    }

    #[test]
    fn feedback_ownership() {
        let post = Feedback {
            id: 1,
            title: "Hi".into(),
            content: "Hello".into(),
            username: "ann".into(),
        };
        assert!(post.is_owned_by("ann"));
        assert!(!post.is_owned_by("bob"));
    }
}
