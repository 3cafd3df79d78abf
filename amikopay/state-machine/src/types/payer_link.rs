//! `PayerLink`: the paying side of one payment, created when the `pay` API
//! confirms a `Receipt` (§4.6). A node has at most one `PayerLink` active per
//! outgoing payment; several may exist concurrently, keyed by `RequestId`.
use amikopay_primitives::types::{
	Amount,
	LocalId,
	MeetingPointId,
	RequestId,
	Token,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PayerLinkPhase {
	/// `Pay` sent; waiting for `Receipt`.
	AwaitingReceipt,
	/// `Receipt` received; waiting for the operator to call `confirmPayment`.
	AwaitingConfirmation,
	/// `Confirm` sent, `MakeRoute` flooded outward; waiting for
	/// `HavePayerRoute`.
	Routing,
	/// Route established, `Lock` sent; waiting for `Commit`.
	Locked,
	/// `Commit` verified and forwarded; payment complete.
	Committed,
	/// No route found, or the payee declined.
	Cancelled,
	/// No `Receipt` arrived before the deadline.
	TimedOut,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayerLinkState {
	pub request_id: RequestId,
	/// The Link this node used to deliver `Pay` to the payee.
	pub remote_link: LocalId,
	pub amount: Amount,
	pub receipt: Option<String>,
	pub transaction_id: Option<TransactionId>,
	pub meeting_point_id: Option<MeetingPointId>,
	pub token: Option<Token>,
	pub phase: PayerLinkPhase,
}

impl PayerLinkState {
	pub fn new(request_id: RequestId, remote_link: LocalId, amount: Amount) -> Self {
		PayerLinkState {
			request_id,
			remote_link,
			amount,
			receipt: None,
			transaction_id: None,
			meeting_point_id: None,
			token: None,
			phase: PayerLinkPhase::AwaitingReceipt,
		}
	}
}
