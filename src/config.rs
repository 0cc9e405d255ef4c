//! Server configuration
//!
//! Settings come from the command line and, optionally, a TOML file. Values
//! present in the file override the command line.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

use crate::quest::QUESTS_FILE;

#[derive(Parser, Debug, Clone)]
#[clap(name = "listen-quest-server", about = "Tracks listening quests against a music catalog")]
pub struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Directory holding genres.json, songs.json, questTemplates.json and quests.json.
    #[clap(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Quest collection to load and write back. Defaults to quests.json in the data directory.
    #[clap(long)]
    pub quests_file: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The address to bind.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Reload the catalog and templates when their files change.
    #[clap(long)]
    pub hot_reload: bool,

    /// Log every HTTP request.
    #[clap(long)]
    pub log_requests: bool,

    /// Check the data files for problems and exit.
    #[clap(long)]
    pub check_only: bool,
}

/// Settings read from the TOML file; every field is optional
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub quests_file: Option<String>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub hot_reload: Option<bool>,
    pub log_requests: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub quests_file: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub hot_reload: bool,
    pub log_requests: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    pub fn resolve(cli: &CliArgs, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file.data_dir.map(PathBuf::from).unwrap_or_else(|| cli.data_dir.clone());
        if !data_dir.is_dir() {
            bail!("Data directory does not exist: {:?}", data_dir);
        }

        let quests_file = file
            .quests_file
            .map(PathBuf::from)
            .or_else(|| cli.quests_file.clone())
            .unwrap_or_else(|| data_dir.join(QUESTS_FILE));

        let bind = match file.bind {
            Some(bind) => bind
                .parse()
                .with_context(|| format!("Invalid bind address in config file: {}", bind))?,
            None => cli.bind,
        };

        Ok(Self {
            data_dir,
            quests_file,
            bind,
            port: file.port.unwrap_or(cli.port),
            hot_reload: file.hot_reload.unwrap_or(cli.hot_reload),
            log_requests: file.log_requests.unwrap_or(cli.log_requests),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
