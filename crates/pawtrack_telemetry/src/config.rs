use crate::StoreError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub database: String,
    pub token: Option<SecretString>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("PAWTRACK_INFLUX_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StoreError::Config("PAWTRACK_INFLUX_URL missing".into()))?;
        let database = get("PAWTRACK_INFLUX_DB").unwrap_or_else(|| "pet_health".into());
        let token = get("PAWTRACK_INFLUX_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::new(v.into()));
        Ok(Self {
            base_url,
            database,
            token,
        })
    }
}
