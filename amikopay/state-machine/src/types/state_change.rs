//! Inputs that drive a transition: an inbound message, an API call, or a
//! timer firing (§4.7).
use amikopay_macros::IntoStateChange;
use amikopay_messages::Envelope;
use amikopay_primitives::types::{
	Amount,
	LinkName,
	LocalId,
	MeetingPointId,
	RequestId,
	Timestamp,
};
use serde::{
	Deserialize,
	Serialize,
};

use super::{
	channel::ChannelVariant,
	timer::TimerKey,
};

/// A message arrived from a neighbour, addressed by `envelope.recipient`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct MessageReceived {
	pub envelope: Envelope,
}

/// `makeLink` (§6): register a new neighbour relationship.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct LinkCreated {
	pub name: LinkName,
	pub local_id: LocalId,
	pub remote_id: LocalId,
	pub remote_url: Option<String>,
}

/// `deposit`/on-chain confirmation (§6): add a new channel to a Link.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct ChannelOpened {
	pub link: LocalId,
	pub variant: ChannelVariant,
	pub amount_local: Amount,
	pub amount_remote: Amount,
}

/// `request` (§6): create a PayeeLink awaiting an inbound `Pay`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct PaymentRequested {
	pub request_id: RequestId,
	pub amount: Amount,
	pub receipt: String,
	pub candidate_meeting_points: Vec<MeetingPointId>,
	pub requested_at: Timestamp,
}

/// `pay` (§6): create a PayerLink and send `Pay` down the named Link.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct PaymentInitiated {
	pub request_id: RequestId,
	pub remote_link: LocalId,
	pub amount: Amount,
}

/// `confirmPayment` (§6): accept the received `Receipt` and flood a route.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct PaymentConfirmed {
	pub request_id: RequestId,
	pub meeting_point_id: MeetingPointId,
}

/// `confirmPayment(Payer, false)` (§4.6, §6): the operator declines a
/// received `Receipt`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct PaymentDeclined {
	pub request_id: RequestId,
}

/// A scheduled timer fired for this key (§4.7, §9).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoStateChange)]
pub struct TimerFired {
	pub key: TimerKey,
	pub now: Timestamp,
}

/// The closed set of inputs the state machine reacts to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
	MessageReceived(MessageReceived),
	LinkCreated(LinkCreated),
	ChannelOpened(ChannelOpened),
	PaymentRequested(PaymentRequested),
	PaymentInitiated(PaymentInitiated),
	PaymentConfirmed(PaymentConfirmed),
	PaymentDeclined(PaymentDeclined),
	TimerFired(TimerFired),
}
