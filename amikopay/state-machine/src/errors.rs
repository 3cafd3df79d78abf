//! Errors raised by state transitions (§7). Collaborator-specific failures
//! (`PersistenceFailure`, `BackendUnavailable`) live in their own crates and
//! are folded into `amikopay_node::NodeError` at the node layer.
use amikopay_primitives::types::{
	Amount,
	ChannelIndex,
	LocalId,
	TransactionId,
};
use thiserror::Error;

/// A `Channel` operation violated a capacity invariant (§4.2).
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ChannelError {
	#[error("transaction {0} already has a reservation or lock on this channel")]
	AlreadyPresent(TransactionId),
	#[error("insufficient spare capacity for {amount} on channel (transaction {transaction_id})")]
	InsufficientCapacity { transaction_id: TransactionId, amount: Amount },
	#[error("transaction {0} has no reservation on this channel")]
	NotReserved(TransactionId),
	#[error("transaction {0} has no lock on this channel")]
	NotLocked(TransactionId),
	#[error("transaction {0} is not present on this channel")]
	NotFound(TransactionId),
}

/// Top-level state-transition failure (§7).
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StateTransitionError {
	#[error("channel {link} #{channel_index}: {source}")]
	Channel { link: LocalId, channel_index: ChannelIndex, source: ChannelError },
	#[error("no route available for transaction {0}")]
	RouteUnavailable(TransactionId),
	#[error("transaction {0} is already in progress")]
	AlreadyInProgress(TransactionId),
	#[error("protocol violation: {0}")]
	ProtocolViolation(String),
	#[error("unknown link {0}")]
	UnknownLink(LocalId),
	#[error("unknown meeting point {0}")]
	UnknownMeetingPoint(String),
	#[error("unknown payee link for request {0}")]
	UnknownPayeeLink(String),
	#[error("unknown transaction {0}")]
	UnknownTransaction(TransactionId),
}
