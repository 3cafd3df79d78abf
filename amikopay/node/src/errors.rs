//! `NodeError` (§7): folds every collaborator failure the loop can hit into
//! one type the API surface reports back to callers. Only
//! `PersistenceFailure` is fatal to the loop itself.
use amikopay_persistence::PersistenceError;
use amikopay_primitives::types::{
	LinkName,
	LocalId,
	RequestId,
};
use amikopay_settlement::SettlementError;
use amikopay_state_machine::errors::StateTransitionError;
use amikopay_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
	#[error(transparent)]
	Transition(#[from] StateTransitionError),
	#[error("persistence failure: {0}")]
	Persistence(#[from] PersistenceError),
	#[error("settlement backend unavailable: {0}")]
	Settlement(#[from] SettlementError),
	#[error("transport error: {0}")]
	Transport(#[from] TransportError),
	#[error("invalid payment URL: {0}")]
	InvalidUrl(#[from] amikopay_messages::url::PaymentUrlError),
	#[error("unknown link {0}")]
	UnknownLink(LinkName),
	#[error("unknown payer link for request {0}")]
	UnknownPayerLink(RequestId),
	#[error("a payer link for request {0} is already in progress")]
	AlreadyInProgress(RequestId),
	#[error("no route is available for request {0}")]
	RouteUnavailable(RequestId),
	#[error("no receipt arrived for request {0} before the deadline")]
	ReceiptTimedOut(RequestId),
	#[error("no Link is registered for peer {0}")]
	UnresolvedPeer(String),
	#[error("channel #{channel_index} on link {link} has funds in flight and cannot be withdrawn")]
	ChannelBusy { link: LocalId, channel_index: usize },
	#[error("unknown channel #{channel_index} on link {link}")]
	UnknownChannel { link: LocalId, channel_index: usize },
	#[error("the node loop has stopped")]
	Stopped,
}
