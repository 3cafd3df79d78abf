//! `NodeState`: the full state owned by one running node, aggregating its
//! Links, MeetingPoints, PayeeLinks, PayerLinks and in-flight Transactions
//! (§3).
use std::collections::HashMap;

use amikopay_primitives::types::{
	LocalId,
	MeetingPointId,
	RequestId,
	TransactionId,
};
use indexmap::IndexMap;
use serde::{
	Deserialize,
	Serialize,
};

use super::{
	link::LinkState,
	meeting_point::MeetingPointState,
	payee_link::PayeeLinkState,
	payer_link::PayerLinkState,
	transaction::Transaction,
};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
	/// Ordered so flooding candidate selection is deterministic (§4.3).
	pub links: IndexMap<LocalId, LinkState>,
	pub meeting_points: HashMap<MeetingPointId, MeetingPointState>,
	pub payee_links: HashMap<RequestId, PayeeLinkState>,
	pub payer_links: HashMap<RequestId, PayerLinkState>,
	pub transactions: HashMap<TransactionId, Transaction>,
	pub payee_link_by_transaction: HashMap<TransactionId, RequestId>,
	pub payer_link_by_transaction: HashMap<TransactionId, RequestId>,
}

impl NodeState {
	pub fn new() -> Self {
		Self::default()
	}
}
