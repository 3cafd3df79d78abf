//! Identifies which waiting entity a scheduled/fired/cancelled timer belongs
//! to (§4.7, §9 "timer min-heap"). A bare `TransactionId` is not enough: a
//! PayerLink's `initial` deadline fires before any transaction exists, and a
//! MeetingPoint may hold a stale entry on either side of the same
//! transaction id independently.
use amikopay_messages::RouteDirection;
use amikopay_primitives::types::{
	MeetingPointId,
	RequestId,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TimerKey {
	/// A PayerLink waiting for `Receipt` (§4.6 `initial + Timeout(initial)`).
	PayerInitial(RequestId),
	/// One side of a transaction parked at a MeetingPoint, waiting for its
	/// counterpart to arrive (§4.4).
	MeetingPointPending { meeting_point_id: MeetingPointId, transaction_id: TransactionId, direction: RouteDirection },
	/// A flooded transaction awaiting `Lock`/`Commit` before it is routed
	/// (§4.7).
	Route(TransactionId),
}
