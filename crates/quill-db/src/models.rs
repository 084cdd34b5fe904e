//! Database row types. These map directly to SQLite rows.
//! Distinct from quill-types models so the password hash stays in this layer.

use quill_types::models::{Feedback, User};

pub struct UserRow {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Borrowed insert payload; `password` must already be hashed.
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

pub struct FeedbackRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub username: Option<String>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            title: row.title,
            content: row.content,
            username: row.username.unwrap_or_default(),
        }
    }
}
