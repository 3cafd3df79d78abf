//! A passive rendezvous matching a payer-side and payee-side flood that
//! share a `transactionID` (§4.4).
use std::collections::HashMap;

use amikopay_primitives::types::{
	Amount,
	LocalId,
	MeetingPointId,
	Timestamp,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

/// One side of a transaction waiting for its counterpart to arrive.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingRoute {
	pub amount: Amount,
	pub start_time: Option<Timestamp>,
	pub end_time: Option<Timestamp>,
	/// The local endpoint (Link, or the node's own PayerLink/PayeeLink) this
	/// side arrived from, used to reply with `HavePayerRoute`/`HavePayeeRoute`.
	pub from: LocalId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MeetingPointState {
	pub id: MeetingPointId,
	pub pending_payer: HashMap<TransactionId, PendingRoute>,
	pub pending_payee: HashMap<TransactionId, PendingRoute>,
}

impl MeetingPointState {
	pub fn new(id: MeetingPointId) -> Self {
		MeetingPointState { id, pending_payer: HashMap::new(), pending_payee: HashMap::new() }
	}
}
