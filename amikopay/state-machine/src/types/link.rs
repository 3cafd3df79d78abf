//! A `Link`: this node's relationship to one neighbour node, carrying an
//! ordered list of bilateral `Channel`s (§3, §4.3).
use std::collections::HashSet;

use amikopay_primitives::types::{
	ChannelIndex,
	LinkName,
	LocalId,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

use super::channel::ChannelState;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
	pub name: LinkName,
	pub local_id: LocalId,
	pub remote_id: LocalId,
	pub remote_url: Option<String>,
	pub channels: Vec<ChannelState>,
	/// Transactions currently routed across this Link, kept for loop
	/// prevention during flooding (§4.3).
	pub open_transactions: HashSet<TransactionId>,
}

impl LinkState {
	pub fn new(name: LinkName, local_id: LocalId, remote_id: LocalId, remote_url: Option<String>) -> Self {
		LinkState { name, local_id, remote_id, remote_url, channels: Vec::new(), open_transactions: HashSet::new() }
	}

	pub fn channel_mut(&mut self, index: ChannelIndex) -> Option<&mut ChannelState> {
		self.channels.get_mut(index)
	}

	pub fn channel(&self, index: ChannelIndex) -> Option<&ChannelState> {
		self.channels.get(index)
	}
}
