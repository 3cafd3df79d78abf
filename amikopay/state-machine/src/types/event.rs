//! Effects a transition asks its caller to carry out (§4.7). The state
//! machine itself never performs I/O; the node event loop drains these.
use amikopay_macros::IntoEvent;
use amikopay_messages::Envelope;
use amikopay_primitives::types::{
	Amount,
	RequestId,
	Timestamp,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

use super::timer::TimerKey;

/// Send a message to a neighbour or deliver it to a local endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoEvent)]
pub struct SendEnvelope {
	pub envelope: Envelope,
}

/// A committed payment should be appended to the append-only pay log
/// (§4.1, §9 "pay log").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoEvent)]
pub struct PaymentSettled {
	pub transaction_id: TransactionId,
	pub request_id: RequestId,
	pub amount: Amount,
	pub settled_at: Timestamp,
}

/// State changed in a way that must be durably persisted before any further
/// externally-visible effect is allowed to take place (§4.1, §6).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoEvent)]
pub struct PersistenceRequested;

/// Ask the node loop to wake `key` up again at `fire_at` unless cancelled
/// first (§4.7, §9 "timer min-heap").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoEvent)]
pub struct TimerScheduled {
	pub key: TimerKey,
	pub fire_at: Timestamp,
}

/// Cancel a previously scheduled timer for `key`, if any.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoEvent)]
pub struct TimerCancelled {
	pub key: TimerKey,
}

/// The closed set of effects a transition may request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Event {
	SendEnvelope(SendEnvelope),
	PaymentSettled(PaymentSettled),
	PersistenceRequested(PersistenceRequested),
	TimerScheduled(TimerScheduled),
	TimerCancelled(TimerCancelled),
}
