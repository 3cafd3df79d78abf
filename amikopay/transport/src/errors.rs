use std::io;

use amikopay_primitives::types::LocalId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
	#[error("could not initialize transport: {0}")]
	Init(String),
	#[error("no peer address registered for {0}")]
	UnknownPeer(LocalId),
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("could not (de)serialize envelope: {0}")]
	Serialization(#[from] serde_json::Error),
	#[error("transport closed")]
	Closed,
}
