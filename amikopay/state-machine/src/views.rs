//! Read-only queries over `NodeState`, kept separate from the transition
//! functions so the API layer (`amikopay-node`) never needs to reach into
//! `machine::*` internals (§6, mirrors the source's own `views.rs`).
use amikopay_primitives::types::{
	Amount,
	LinkName,
	LocalId,
	RequestId,
};

use crate::types::{
	LinkState,
	NodeState,
	PayeeLinkPhase,
	PayerLinkPhase,
};

/// Total local balance across every channel of every Link (§6, `getBalance`).
pub fn total_local_balance(state: &NodeState) -> Amount {
	state.links.values().flat_map(|link| link.channels.iter()).map(|channel| channel.amount_local).sum()
}

/// Total remote balance across every channel of every Link.
pub fn total_remote_balance(state: &NodeState) -> Amount {
	state.links.values().flat_map(|link| link.channels.iter()).map(|channel| channel.amount_remote).sum()
}

pub fn link_by_name<'a>(state: &'a NodeState, name: &LinkName) -> Option<&'a LinkState> {
	state.links.values().find(|link| &link.name == name)
}

pub fn link_by_local_id<'a>(state: &'a NodeState, local_id: &LocalId) -> Option<&'a LinkState> {
	state.links.get(local_id)
}

/// Whether `request_id` has reached a terminal PayeeLink phase.
pub fn payee_request_is_settled(state: &NodeState, request_id: &RequestId) -> bool {
	matches!(
		state.payee_links.get(request_id).map(|link| link.phase),
		Some(PayeeLinkPhase::Committed) | Some(PayeeLinkPhase::Cancelled) | Some(PayeeLinkPhase::Expired)
	)
}

/// Whether `request_id` has reached a terminal PayerLink phase.
pub fn payer_request_is_settled(state: &NodeState, request_id: &RequestId) -> bool {
	matches!(
		state.payer_links.get(request_id).map(|link| link.phase),
		Some(PayerLinkPhase::Committed) | Some(PayerLinkPhase::Cancelled) | Some(PayerLinkPhase::TimedOut)
	)
}

/// Number of transactions currently in flight anywhere in this node (§8,
/// used by tests asserting that a scenario leaves no dangling state).
pub fn in_flight_transaction_count(state: &NodeState) -> usize {
	state.transactions.len()
}
