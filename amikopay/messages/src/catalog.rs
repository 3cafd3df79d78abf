//! The message catalog (§6). Kept as a single closed `enum` so every state
//! handler in `amikopay-state-machine` pattern-matches exhaustively and the
//! compiler enforces coverage of new variants (§9, "Dynamic message dispatch
//! → closed tagged variant").
use amikopay_macros::IntoMessage;
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

/// Which side of a payment a `MakeRoute` flood originates from. The meeting
/// point uses this to index the message into `pendingPayer` or
/// `pendingPayee` (§4.4).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RouteDirection {
	Payer,
	Payee,
}

/// `Pay(ID)`: the first message a payer sends a payee (§6).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct Pay {
	pub request_id: RequestId,
}

/// `Receipt(amount, receipt, transactionID, meetingPoints)` (§6): the
/// payee's reply to `Pay`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct Receipt {
	pub amount: Amount,
	pub receipt: String,
	pub transaction_id: TransactionId,
	pub meeting_points: Vec<MeetingPointId>,
}

/// `Confirm(ID, meetingPointID)` (§6): the payer accepts the receipt and
/// nominates a meeting point. Addressing (which PayeeLink this is for)
/// travels in the envelope, not this struct — see `Envelope::recipient`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct Confirm {
	pub meeting_point_id: MeetingPointId,
}

/// `Cancel(ID)` (§6): the payer declines the receipt, or the payee declines
/// a `Pay`. Carries no payload; addressing is in the envelope.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct PayeeCancel;

/// `MakeRoute(transactionID, amount, direction, meetingPointID, …)` (§6):
/// floods through Links, reserving capacity on each channel it crosses.
///
/// `start_time`/`end_time` are `None` for `Plain` channels and required for
/// `TCD`-backed channels (§9, "Open questions": the source leaves these as
/// `None` with a `TODO`; this implementation makes them mandatory exactly
/// where TCD semantics need them and documents the Plain-channel exception).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct MakeRoute {
	pub transaction_id: TransactionId,
	pub amount: Amount,
	pub direction: RouteDirection,
	pub meeting_point_id: MeetingPointId,
	pub payer_id: Option<LocalId>,
	pub payee_id: Option<LocalId>,
	pub start_time: Option<Timestamp>,
	pub end_time: Option<Timestamp>,
}

/// `HavePayerRoute(ID, transactionID)` (§6): emitted by a MeetingPoint back
/// along the payer path once both sides of a transaction have arrived.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct HavePayerRoute {
	pub id: LocalId,
	pub transaction_id: Option<TransactionId>,
}

/// `HavePayeeRoute(ID, transactionID)` (§6). Preserves the source's
/// possibly-buggy behaviour of carrying `transaction_id = None` when
/// forwarded from a PayeeLink to the payer (§9, "Open questions" — not
/// silently fixed).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct HavePayeeRoute {
	pub id: LocalId,
	pub transaction_id: Option<TransactionId>,
}

/// `Lock(transactionID)` (§6): converts a channel's reservation into a lock.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct Lock {
	pub transaction_id: TransactionId,
}

/// `Commit(token)` (§6): reveals the preimage, unlocking channels into
/// committed balance transfers as it propagates back toward the payer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct Commit {
	pub token: Token,
}

/// `SettleCommit(token)` (§6): follows `Commit` along the same path, driving
/// each side to its terminal `committed` state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct SettleCommit {
	pub token: Token,
}

/// `Cancel` at the Link level (§6): carries `transactionID` so every hop
/// that reserved capacity for it can roll back. Named `RouteCancel` here to
/// keep it distinct from the payee-facing `PayeeCancel`, which has no
/// transaction id yet at the point it is sent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, IntoMessage)]
pub struct RouteCancel {
	pub transaction_id: TransactionId,
}

/// The closed set of protocol messages (§6). `#[serde(tag = "type")]` gives
/// each variant an explicit wire tag rather than relying on field-shape
/// disambiguation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
	Pay(Pay),
	Receipt(Receipt),
	Confirm(Confirm),
	PayeeCancel(PayeeCancel),
	MakeRoute(MakeRoute),
	HavePayerRoute(HavePayerRoute),
	HavePayeeRoute(HavePayeeRoute),
	Lock(Lock),
	Commit(Commit),
	SettleCommit(SettleCommit),
	RouteCancel(RouteCancel),
}

impl Message {
	/// Returns the string type name of the message, useful for logging.
	pub fn type_name(&self) -> &'static str {
		match self {
			Message::Pay(_) => "Pay",
			Message::Receipt(_) => "Receipt",
			Message::Confirm(_) => "Confirm",
			Message::PayeeCancel(_) => "PayeeCancel",
			Message::MakeRoute(_) => "MakeRoute",
			Message::HavePayerRoute(_) => "HavePayerRoute",
			Message::HavePayeeRoute(_) => "HavePayeeRoute",
			Message::Lock(_) => "Lock",
			Message::Commit(_) => "Commit",
			Message::SettleCommit(_) => "SettleCommit",
			Message::RouteCancel(_) => "RouteCancel",
		}
	}
}

/// A message addressed to a specific local endpoint: a Link (by
/// `localID`), a PayeeLink (by `requestID`), or the payer singleton (by
/// `PAYER_LOCAL_ID`). Mirrors the source's `OutboundMessage` wrapper.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	pub recipient: LocalId,
	pub message: Message,
}

impl Envelope {
	pub fn new(recipient: LocalId, message: impl Into<Message>) -> Self {
		Envelope { recipient, message: message.into() }
	}
}
