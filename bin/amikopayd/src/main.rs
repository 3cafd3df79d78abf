mod cli;
mod config;

use std::{
	sync::Arc,
	time::{
		SystemTime,
		UNIX_EPOCH,
	},
};

use amikopay_node::{
	Node,
	NodeConfig,
};
use amikopay_settlement::MockSettlementBackend;
use amikopay_transport::{
	TcpTransport,
	TransportConfig,
};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

fn now_unix_seconds() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is before the Unix epoch").as_secs()
}

#[tokio::main]
async fn main() {
	let opt = cli::Opt::from_args();
	let daemon_config = match config::load(&opt) {
		Ok(config) => config,
		Err(err) => {
			eprintln!("amikopayd: {}", err);
			std::process::exit(1);
		},
	};

	tracing_subscriber::fmt().with_env_filter(EnvFilter::new(&daemon_config.log_filter)).init();
	tracing::info!(data_dir = %daemon_config.data_dir.display(), listen = %daemon_config.listen_address, "starting amikopayd");

	let transport = Arc::new(TcpTransport::new(TransportConfig::new(daemon_config.listen_address)));
	// No on-chain settlement backend is wired up yet (§1, Non-goals): this
	// keeps the node loop's settlement-watchdog step exercised without
	// needing a live chain connection.
	let settlement = Arc::new(MockSettlementBackend::new(0));

	let node_config = NodeConfig {
		host: daemon_config.host.clone(),
		port: daemon_config.port,
		snapshot_path: daemon_config.snapshot_path(),
		paylog_path: daemon_config.paylog_path(),
	};

	let (node, handle) = match Node::start(node_config, transport, settlement).await {
		Ok(pair) => pair,
		Err(err) => {
			tracing::error!(?err, "failed to start node");
			std::process::exit(1);
		},
	};

	let mut loop_handle = tokio::spawn(node.run(now_unix_seconds));

	tokio::select! {
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received interrupt, stopping node");
			handle.stop().await;
		}
		result = &mut loop_handle => {
			if let Err(err) = result {
				tracing::error!(?err, "node loop task panicked");
			}
			return;
		}
	}

	if let Err(err) = loop_handle.await {
		tracing::error!(?err, "node loop task panicked while shutting down");
	}
}
