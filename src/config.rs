use std::net::SocketAddr;

use anyhow::Context;

use crate::models::MAX_ROWS;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub default_take: u64,
    pub max_take: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://filmes.db?mode=rwc".to_string());

        let default_take: u64 = var("DEFAULT_TAKE").and_then(|s| s.parse().ok()).unwrap_or(50);
        let max_take: u64 = var("MAX_TAKE").and_then(|s| s.parse().ok()).unwrap_or(1000);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            default_take: default_take.min(MAX_ROWS),
            max_take: max_take.clamp(1, MAX_ROWS),
        })
    }
}
