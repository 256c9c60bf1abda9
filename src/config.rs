use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub slot_dir: PathBuf,
    pub slot_key: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 =
            lookup("PORT").unwrap_or_else(|| "5000".to_string()).parse().context("PORT")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://marquee.db?mode=rwc".to_string());

        let slot_dir = lookup("SLOT_DIR").map(PathBuf::from).unwrap_or_else(|| "data".into());
        let slot_key = lookup("SLOT_KEY").unwrap_or_else(|| "movies".to_string());

        let max_body_bytes: usize = lookup("MAX_BODY_BYTES")
            .map(|s| s.parse::<usize>().context("MAX_BODY_BYTES"))
            .transpose()?
            .unwrap_or(10 * 1024 * 1024);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            slot_dir,
            slot_key,
            max_body_bytes,
        })
    }
}
