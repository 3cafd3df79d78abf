//! Failures raised by snapshot save/load and pay-log appends. Folded into
//! `amikopay_node::NodeError` at the node layer, same as
//! `amikopay_state_machine::errors::StateTransitionError`.
use std::{
	io,
	path::PathBuf,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
	#[error("io error on {path}: {source}")]
	Io { path: PathBuf, source: io::Error },
	#[error("cannot serialize snapshot: {0}")]
	Serialization(#[from] serde_json::Error),
	#[error("no snapshot found at {0}")]
	NotFound(PathBuf),
}

impl PersistenceError {
	pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
		PersistenceError::Io { path: path.to_path_buf(), source }
	}
}
