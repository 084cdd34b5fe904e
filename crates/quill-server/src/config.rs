use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const MIN_SECRET_LEN: usize = 32;

/// One year. Longer lifetimes push token expiry past what chrono can represent.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Runtime settings read from `QUILL_*` environment variables.
#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("QUILL_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("QUILL_SESSION_SECRET is unset or still a placeholder");
        }
        if session_secret.len() < MIN_SECRET_LEN {
            bail!("QUILL_SESSION_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }

        let host = lookup("QUILL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("QUILL_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("QUILL_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

        let db_path: PathBuf = lookup("QUILL_DB_PATH").unwrap_or_else(|| "quill.db".into()).into();

        let session_ttl_hours: i64 = match lookup("QUILL_SESSION_TTL_HOURS") {
            Some(v) => v.parse().context("QUILL_SESSION_TTL_HOURS must be an integer")?,
            None => 168, // 7 days
        };
        if session_ttl_hours <= 0 {
            bail!("QUILL_SESSION_TTL_HOURS must be positive");
        }
        if session_ttl_hours > MAX_SESSION_TTL_HOURS {
            bail!(
                "QUILL_SESSION_TTL_HOURS must be at most {} (one year)",
                MAX_SESSION_TTL_HOURS
            );
        }

        let secure_cookies = lookup("QUILL_SECURE_COOKIES")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            addr,
            db_path,
            session_secret,
            session_ttl_hours,
            secure_cookies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("QUILL_SESSION_SECRET", SECRET)]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("quill.db"));
        assert_eq!(config.session_ttl_hours, 168);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("QUILL_SESSION_SECRET", SECRET),
            ("QUILL_HOST", "127.0.0.1"),
            ("QUILL_PORT", "8080"),
            ("QUILL_DB_PATH", "/tmp/q.db"),
            ("QUILL_SESSION_TTL_HOURS", "2"),
            ("QUILL_SECURE_COOKIES", "true"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("/tmp/q.db"));
        assert_eq!(config.session_ttl_hours, 2);
        assert!(config.secure_cookies);
    }

    #[test]
    fn secret_is_required_and_checked() {
        assert!(load(&[]).is_err());
        assert!(load(&[("QUILL_SESSION_SECRET", "dev-secret-change-me")]).is_err());
        assert!(load(&[("QUILL_SESSION_SECRET", "short")]).is_err());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(load(&[("QUILL_SESSION_SECRET", SECRET), ("QUILL_PORT", "http")]).is_err());
        assert!(load(&[("QUILL_SESSION_SECRET", SECRET), ("QUILL_SESSION_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn session_ttl_is_capped_at_one_year() {
        let at_cap = load(&[("QUILL_SESSION_SECRET", SECRET), ("QUILL_SESSION_TTL_HOURS", "8760")]).unwrap();
        assert_eq!(at_cap.session_ttl_hours, 8760);

        assert!(load(&[("QUILL_SESSION_SECRET", SECRET), ("QUILL_SESSION_TTL_HOURS", "8761")]).is_err());
        assert!(load(&[("QUILL_SESSION_SECRET", SECRET), ("QUILL_SESSION_TTL_HOURS", "3000000000")]).is_err());
    }
}
