mod file_config;

pub use file_config::FileConfig;

use crate::book_store::StorageBackend;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub backend: StorageBackend,
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            backend: StorageBackend::default(),
            db_path: None,
            port: server.port,
            bind_address: server.bind_address,
            logging_level: server.requests_logging_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
    pub db_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let backend = match file.backend {
            Some(name) => parse_backend(&name)?,
            None => cli.backend,
        };

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| backend.default_db_path());

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = match file.logging_level {
            Some(name) => parse_logging_level(&name)?,
            None => cli.logging_level,
        };

        Ok(Self {
            backend,
            db_path,
            port,
            bind_address,
            logging_level,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level,
            port: self.port,
            bind_address: self.bind_address.clone(),
        }
    }
}

fn parse_backend(s: &str) -> Result<StorageBackend> {
    StorageBackend::from_str(s, true).map_err(|_| anyhow!("Unknown storage backend {:?}", s))
}

fn parse_logging_level(s: &str) -> Result<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).map_err(|_| anyhow!("Unknown logging level {:?}", s))
}
