//! Shared helpers for locating a channel with spare capacity and building
//! the `SendEnvelope` events that carry messages between hops (§4.3).
use amikopay_primitives::types::{
	Amount,
	ChannelIndex,
	LocalId,
};

use crate::{
	errors::StateTransitionError,
	types::{
		NodeState,
		ReserveSide,
	},
};

/// Finds the first Link (other than `exclude`, in registration order) with
/// a channel that can accommodate `amount` on `side`, reserves it, and
/// returns `(link, channel_index)`.
pub fn reserve_first_fit(
	state: &mut NodeState,
	exclude: Option<&LocalId>,
	transaction_id: amikopay_primitives::types::TransactionId,
	amount: Amount,
	side: ReserveSide,
) -> Option<(LocalId, ChannelIndex)> {
	let candidates: Vec<LocalId> = state
		.links
		.iter()
		.filter(|entry| Some(entry.0) != exclude)
		.filter(|entry| !entry.1.open_transactions.contains(&transaction_id))
		.map(|entry| entry.0.clone())
		.collect();

	for link_id in candidates {
		let link = state.links.get_mut(&link_id).expect("candidate came from state.links");
		for (index, channel) in link.channels.iter_mut().enumerate() {
			let reserved = match side {
				ReserveSide::Outgoing => channel.reserve_outgoing(transaction_id, amount).is_ok(),
				ReserveSide::Incoming => channel.reserve_incoming(transaction_id, amount).is_ok(),
			};
			if reserved {
				link.open_transactions.insert(transaction_id);
				return Some((link_id, index))
			}
		}
	}
	None
}

pub fn channel_mut<'a>(
	state: &'a mut NodeState,
	link: &LocalId,
	index: ChannelIndex,
) -> Result<&'a mut crate::types::ChannelState, StateTransitionError> {
	state
		.links
		.get_mut(link)
		.ok_or_else(|| StateTransitionError::UnknownLink(link.clone()))?
		.channel_mut(index)
		.ok_or_else(|| StateTransitionError::UnknownLink(link.clone()))
}
