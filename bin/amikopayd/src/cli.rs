use std::{
	net::SocketAddr,
	path::PathBuf,
};

use structopt::StructOpt;

/// Command-line flags: each one overrides the matching key in
/// `--config`'s `toml` file.
#[derive(StructOpt, Debug)]
#[structopt(name = "amikopayd", about = "amikopay payment-channel node daemon")]
pub struct Opt {
	/// Path to a `toml` config file providing defaults for the flags below.
	#[structopt(long, parse(from_os_str))]
	pub config: Option<PathBuf>,

	/// Directory holding this node's snapshot and pay log.
	#[structopt(long, parse(from_os_str))]
	pub data_dir: Option<PathBuf>,

	/// Address the transport listens on for inbound peer connections.
	#[structopt(long)]
	pub listen_address: Option<SocketAddr>,

	/// Hostname advertised in payment URLs this node issues.
	#[structopt(long)]
	pub host: Option<String>,

	/// Port advertised in payment URLs this node issues.
	#[structopt(long)]
	pub port: Option<u16>,

	/// `tracing-subscriber` env-filter directive, e.g. `info` or `amikopay_node=debug`.
	#[structopt(long)]
	pub log_filter: Option<String>,
}
