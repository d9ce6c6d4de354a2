use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub ckb_node: CkbNodeSettings,
    pub indexer: IndexerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn redacted_connection_string(&self) -> String {
        self.connection_string().replace(&self.password, "REDACTED")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CkbNodeSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexerSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_cleaner_interval_secs")]
    pub cleaner_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_cleaner_interval_secs() -> u64 {
    3600
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(Environment::default().separator("__"))
            .set_default("indexer.poll_interval_secs", 1)?
            .set_default("indexer.cleaner_interval_secs", 3600)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .build()?;

        config.try_deserialize()
    }
}
