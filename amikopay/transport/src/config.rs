//! Transport configuration: where this node listens, and which network
//! address each of its Links' remote peers is reachable at.
use std::{
	collections::HashMap,
	net::SocketAddr,
};

use amikopay_primitives::types::LocalId;

#[derive(Clone, Debug)]
pub struct TransportConfig {
	pub listen_address: SocketAddr,
	/// `envelope.recipient` (this node's own local id for the Link) to the
	/// remote peer's TCP address, one entry per Link.
	pub peers: HashMap<LocalId, SocketAddr>,
}

impl TransportConfig {
	pub fn new(listen_address: SocketAddr) -> Self {
		Self { listen_address, peers: HashMap::new() }
	}

	pub fn with_peer(mut self, local_id: LocalId, addr: SocketAddr) -> Self {
		self.peers.insert(local_id, addr);
		self
	}
}
