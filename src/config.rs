use anyhow::Context;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "sqlite://mongo-codealong.db?mode=rwc";
const DEFAULT_SERVER_PORT: u16 = 9000;

#[derive(Debug)]
pub struct Config {
    database_url: String,
    server_port: u16,
    reset_database: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset variables
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let server_port = load_or(&lookup, "PORT", DEFAULT_SERVER_PORT)?;
        let reset_database = lookup("RESET_DATABASE").is_some_and(|val| parse_flag(&val));
        Ok(Self {
            database_url,
            server_port,
            reset_database,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }

    #[must_use]
    pub const fn reset_database(&self) -> bool {
        self.reset_database
    }
}

fn load_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse environment variable {key}")),
        None => Ok(default),
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
