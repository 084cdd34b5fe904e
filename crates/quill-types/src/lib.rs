pub mod forms;
pub mod models;

/// Longest username accepted at registration. Matches the `users` column limit.
pub const USERNAME_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 50;
pub const NAME_MAX_LEN: usize = 30;
pub const TITLE_MAX_LEN: usize = 100;
