use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Country assigned to people created through mobile registration when no
    /// nationality is known yet.
    pub default_country: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let default_country = env::var("DEFAULT_COUNTRY").unwrap_or_else(|_| "Egypt".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            default_country,
        })
    }
}
