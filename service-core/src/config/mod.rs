use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Config {
    /// Load from an optional `configuration` file, then the environment (`PORT`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let vars = env::var("PORT")
            .ok()
            .map(|port| ("PORT".to_string(), port))
            .into_iter()
            .collect();
        Self::load_from(vars)
    }

    /// Load with `vars` standing in for the process environment. Empty
    /// values are treated as unset.
    pub fn load_from(vars: HashMap<String, String>) -> Result<Self, AppError> {
        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(
                config::Environment::default()
                    .source(Some(vars))
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
