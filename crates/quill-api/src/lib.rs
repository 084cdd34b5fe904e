pub mod auth;
mod blocking;
pub mod credentials;
pub mod error;
pub mod feedback;
pub mod flash;
pub mod guard;
pub mod middleware;
pub mod posts;
pub mod router;
pub mod session;
pub mod state;
pub mod users;
pub mod views;

pub use router::router;
pub use state::{AppState, AppStateInner};
