use std::sync::Arc;

use tracing::info;

use quill_db::Database;
use quill_types::forms::FeedbackForm;
use quill_types::models::Feedback;

use crate::error::AppError;
use crate::guard::{self, RequestContext};

/// Feedback posts, each scoped to its owning user. Every mutation goes
/// through the session guard first.
#[derive(Clone)]
pub struct FeedbackRepository {
    db: Arc<Database>,
}

impl FeedbackRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(&self, ctx: &RequestContext, owner: &str, form: &FeedbackForm) -> Result<Feedback, AppError> {
        guard::require_owner(ctx, owner)?;

        // The session can outlive the account it names.
        if self.db.get_user(owner)?.is_none() {
            return Err(AppError::NotFound);
        }

        let id = self.db.insert_feedback(owner, &form.title, &form.content)?;
        info!("Feedback {} created by {}", id, owner);

        Ok(Feedback {
            id,
            title: form.title.clone(),
            content: form.content.clone(),
            username: owner.to_string(),
        })
    }

    pub fn get(&self, id: i64) -> Result<Feedback, AppError> {
        self.db
            .get_feedback(id)?
            .map(Feedback::from)
            .ok_or(AppError::NotFound)
    }

    /// Load a post the caller owns. Login is checked before the lookup so
    /// anonymous callers cannot learn which ids exist.
    pub fn get_owned(&self, ctx: &RequestContext, id: i64) -> Result<Feedback, AppError> {
        guard::require_login(ctx)?;
        let post = self.get(id)?;
        guard::require_owner(ctx, &post.username)?;
        Ok(post)
    }

    pub fn update(&self, ctx: &RequestContext, id: i64, form: &FeedbackForm) -> Result<Feedback, AppError> {
        self.get_owned(ctx, id)?;

        let updated = self
            .db
            .update_feedback(id, &form.title, &form.content)?
            .ok_or(AppError::NotFound)?;
        info!("Feedback {} updated", id);
        Ok(updated.into())
    }

    /// Deletes only when the caller owns the post; otherwise nothing changes.
    pub fn delete(&self, ctx: &RequestContext, id: i64) -> Result<Feedback, AppError> {
        let post = self.get_owned(ctx, id)?;

        if !self.db.delete_feedback(id)? {
            return Err(AppError::NotFound);
        }
        info!("Feedback {} deleted by {}", id, post.username);
        Ok(post)
    }

    pub fn list_for_user(&self, username: &str) -> anyhow::Result<Vec<Feedback>> {
        let rows = self.db.list_feedback_for_user(username)?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    pub fn count_for_user(&self, username: &str) -> anyhow::Result<u64> {
        self.db.count_feedback_for_user(username)
    }
}
