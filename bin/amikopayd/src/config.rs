//! Config loading (§1: out of scope for the core crates, lives only in the
//! binary). A `toml` file supplies defaults; CLI flags override it.
use std::{
	fs,
	net::SocketAddr,
	path::PathBuf,
};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::Opt;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("could not read config file {path}: {source}")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("could not parse config file {path}: {source}")]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("could not create data directory {0}: {1}")]
	DataDir(PathBuf, std::io::Error),
}

/// What a `toml` config file may supply; every field is also settable from
/// the CLI, which takes precedence when present.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
	data_dir: Option<PathBuf>,
	listen_address: Option<SocketAddr>,
	host: Option<String>,
	port: Option<u16>,
	log_filter: Option<String>,
}

/// The fully-resolved configuration this binary runs with.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
	pub data_dir: PathBuf,
	pub listen_address: SocketAddr,
	pub host: String,
	pub port: u16,
	pub log_filter: String,
}

impl DaemonConfig {
	pub fn snapshot_path(&self) -> PathBuf {
		self.data_dir.join("state.json")
	}

	pub fn paylog_path(&self) -> PathBuf {
		self.data_dir.join("paylog.jsonl")
	}
}

/// Merges an optional `toml` file with CLI overrides and ensures the
/// resulting data directory exists.
pub fn load(opt: &Opt) -> Result<DaemonConfig, ConfigError> {
	let file = match &opt.config {
		Some(path) => {
			let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
			toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.clone(), source })?
		},
		None => FileConfig::default(),
	};

	let data_dir = opt.data_dir.clone().or(file.data_dir).unwrap_or_else(|| PathBuf::from("./amikopay-data"));
	if !data_dir.exists() {
		fs::create_dir_all(&data_dir).map_err(|source| ConfigError::DataDir(data_dir.clone(), source))?;
	}

	let listen_address = opt.listen_address.or(file.listen_address).unwrap_or_else(|| "127.0.0.1:4321".parse().unwrap());
	let host = opt.host.clone().or(file.host).unwrap_or_else(|| listen_address.ip().to_string());
	let port = opt.port.or(file.port).unwrap_or_else(|| listen_address.port());
	let log_filter = opt.log_filter.clone().or(file.log_filter).unwrap_or_else(|| "info".to_string());

	Ok(DaemonConfig { data_dir, listen_address, host, port, log_filter })
}
