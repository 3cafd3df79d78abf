//! The node-global bookkeeping record for one in-flight payment (§3).
use amikopay_primitives::types::{
	Amount,
	ChannelIndex,
	LocalId,
	MeetingPointId,
	Timestamp,
};
use serde::{
	Deserialize,
	Serialize,
};

/// Which side of a reservation this node made for a transaction hop: the
/// amount it pledged outward to the next hop, or the amount a previous hop
/// pledged inward to it (§4.2, §4.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReserveSide {
	Outgoing,
	Incoming,
}

/// Where this node's own reservation for a transaction lives, if any. The
/// MeetingPoint and the true payer/payee origin nodes may have none.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
	pub link: LocalId,
	pub channel_index: ChannelIndex,
	pub side: ReserveSide,
}

/// Tracks one payment from `MakeRoute` issuance to commit/cancel (§3).
///
/// `payer_id`/`payee_id` name the local endpoint (a Link, or `None` at the
/// true payer/payee origin) this node must forward `Lock`/`Commit` toward:
/// `payer_id` is the direction back to the payer, `payee_id` the direction
/// onward to the payee. Once a MeetingPoint bridges both sides these two
/// fields describe one continuous path, regardless of which flood first
/// discovered each half.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	pub amount: Amount,
	pub start_time: Option<Timestamp>,
	pub end_time: Option<Timestamp>,
	pub meeting_point_id: MeetingPointId,
	pub payer_id: Option<LocalId>,
	pub payee_id: Option<LocalId>,
	pub reservation: Option<Reservation>,
}
