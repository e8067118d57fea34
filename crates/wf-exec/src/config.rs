use once_cell::sync::Lazy;
use std::env;

/// Process-wide settings read once from the environment. `dotenvy` (loaded
/// by the CLI before this is first touched) is what makes a `.env` file in
/// the working directory show up here.
pub struct AppConfig {
    pub datastore_host: String,
    pub datastore_port: u16,
    pub datastore_db: u32,
    pub datastore_password: Option<String>,
    pub pool_thread_workers: usize,
    pub pool_process_workers: usize,
    pub log_level: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Absent variable falls back to `default`; a variable that *is* set but
/// won't parse as `T` is a startup error, not a silent default.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| panic!("{key}: expected a valid value, got {v:?}")),
        Err(_) => default,
    }
}

impl AppConfig {
    fn from_env() -> Self {
        Self {
            datastore_host: env_or("DATASTORE_HOST", "127.0.0.1"),
            datastore_port: env_parsed("DATASTORE_PORT", 6379),
            datastore_db: env_parsed("DATASTORE_DB", 0),
            datastore_password: env::var("DATASTORE_PASSWORD").ok(),
            pool_thread_workers: env_parsed("POOL_THREAD_WORKERS", 10),
            pool_process_workers: env_parsed("POOL_PROCESS_WORKERS", 4),
            log_level: env_or("LOG_LEVEL", "info"),
        }
    }
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
