use std::sync::Arc;

use quill_db::Database;

use crate::credentials::{CredentialHasher, CredentialStore};
use crate::feedback::FeedbackRepository;
use crate::session::SessionConfig;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub feedback: FeedbackRepository,
    pub session: SessionConfig,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, hasher: Arc<dyn CredentialHasher>, session: SessionConfig) -> AppState {
        Arc::new(Self {
            credentials: CredentialStore::new(db.clone(), hasher),
            feedback: FeedbackRepository::new(db),
            session,
        })
    }
}
