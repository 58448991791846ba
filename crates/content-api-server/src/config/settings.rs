use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Environment-driven configuration.
///
/// The deployment contract is plain environment variables (optionally via a
/// `.env` file), no settings file: `FRONTEND_URL`, `POSTGRES_URL`,
/// `SESSION_SECRET`, `NODE_ENV`, `PORT`.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// PostgreSQL DSN. Required.
    pub postgres_url: String,

    /// Cookie-signing and response-encryption key. Required, no default —
    /// starting without one would silently undermine every session.
    pub session_secret: String,

    #[serde(default = "default_node_env")]
    pub node_env: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_node_env() -> String {
    "development".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Gates the `Secure` cookie attribute.
    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }
}
