use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SettlementError {
	#[error("settlement backend unavailable: {0}")]
	Unavailable(String),
	#[error("invalid raw transaction: {0}")]
	InvalidTransaction(String),
	#[error("unknown transaction id: {0}")]
	UnknownTransaction(String),
}
