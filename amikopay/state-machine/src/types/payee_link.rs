//! `PayeeLink`: the receiving side of one payment, created locally by the
//! `request` API and driven by the incoming `Pay`/`Confirm`/`Lock` exchange
//! (§4.5).
use amikopay_primitives::types::{
	Amount,
	LocalId,
	MeetingPointId,
	RequestId,
	Timestamp,
	Token,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PayeeLinkPhase {
	/// Created via `request`; a `Pay` carrying this `request_id` is awaited.
	AwaitingPay,
	/// `Receipt` sent; waiting for the payer's `Confirm`.
	AwaitingConfirm,
	/// `Confirm` received, `MakeRoute` flooded outward; waiting for
	/// `HavePayeeRoute`.
	Routing,
	/// Route established; waiting for `Lock` to arrive.
	RouteEstablished,
	/// `Commit`/`SettleCommit` emitted; payment complete.
	Committed,
	/// No route found, or the counterpart declined.
	Cancelled,
	/// `Receipt` expired before a `Confirm` arrived.
	Expired,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayeeLinkState {
	pub request_id: RequestId,
	pub amount: Amount,
	pub receipt: String,
	pub token: Token,
	pub transaction_id: TransactionId,
	pub candidate_meeting_points: Vec<MeetingPointId>,
	pub chosen_meeting_point: Option<MeetingPointId>,
	pub receipt_issued_at: Timestamp,
	pub receipt_expires_at: Timestamp,
	/// The Link `Pay` arrived on; `Receipt` and any later reply travel back
	/// out on it.
	pub initiator_link: Option<LocalId>,
	pub phase: PayeeLinkPhase,
}

impl PayeeLinkState {
	pub fn new(
		request_id: RequestId,
		amount: Amount,
		receipt: String,
		token: Token,
		transaction_id: TransactionId,
		candidate_meeting_points: Vec<MeetingPointId>,
		receipt_issued_at: Timestamp,
		receipt_expires_at: Timestamp,
	) -> Self {
		PayeeLinkState {
			request_id,
			amount,
			receipt,
			token,
			transaction_id,
			candidate_meeting_points,
			chosen_meeting_point: None,
			receipt_issued_at,
			receipt_expires_at,
			initiator_link: None,
			phase: PayeeLinkPhase::AwaitingPay,
		}
	}
}
