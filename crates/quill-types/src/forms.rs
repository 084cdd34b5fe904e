use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EMAIL_MAX_LEN, NAME_MAX_LEN, TITLE_MAX_LEN, USERNAME_MAX_LEN};

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// -- Auth --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "username", &self.username);
        max_len(&mut errors, "username", &self.username, USERNAME_MAX_LEN);
        required(&mut errors, "password", &self.password);
        required(&mut errors, "email", &self.email);
        if !self.email.trim().is_empty() && !looks_like_email(&self.email) {
            errors.add("email", "Not a valid email.");
        }
        max_len(&mut errors, "email", &self.email, EMAIL_MAX_LEN);
        required(&mut errors, "first_name", &self.first_name);
        max_len(&mut errors, "first_name", &self.first_name, NAME_MAX_LEN);
        required(&mut errors, "last_name", &self.last_name);
        max_len(&mut errors, "last_name", &self.last_name, NAME_MAX_LEN);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "username", &self.username);
        required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

// -- Feedback --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub title: String,
    pub content: String,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "title", &self.title);
        max_len(&mut errors, "title", &self.title, TITLE_MAX_LEN);
        required(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
    }
}

fn max_len(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Maximum {} characters", max));
    }
}

/// Shape check only: one `@`, a non-empty local part, and a dotted domain.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "ann".into(),
            password: "pw1".into(),
            email: "ann@example.com".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register_form().validate().is_ok());
    }

    #[test]
    fn username_over_twenty_chars_is_rejected() {
        let form = RegisterForm {
            username: "a".repeat(21),
            ..register_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("username"), ["Maximum 20 characters"]);
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = RegisterForm::default().validate().unwrap_err();
        for field in ["username", "password", "email", "first_name", "last_name"] {
            assert_eq!(errors.get(field), ["This field is required."], "{field}");
        }
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ann@example.com"));
        assert!(looks_like_email("a.b+c@mail.example.org"));
        assert!(!looks_like_email("ann"));
        assert!(!looks_like_email("ann@localhost"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ann@@example.com"));
        assert!(!looks_like_email("ann @example.com"));
        assert!(!looks_like_email("ann@.com"));

        let form = RegisterForm {
            email: "not-an-email".into(),
            ..register_form()
        };
        assert_eq!(form.validate().unwrap_err().get("email"), ["Not a valid email."]);
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            username: "ann".into(),
            password: "   ".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("username").is_empty());
        assert_eq!(errors.get("password").len(), 1);
    }

    #[test]
    fn feedback_title_limit() {
        let ok = FeedbackForm {
            title: "t".repeat(100),
            content: "body".into(),
        };
        assert!(ok.validate().is_ok());

        let long = FeedbackForm {
            title: "t".repeat(101),
            content: String::new(),
        };
        let errors = long.validate().unwrap_err();
        assert_eq!(errors.get("title"), ["Maximum 100 characters"]);
        assert_eq!(errors.get("content"), ["This field is required."]);
    }
}
