//! The append-only pay log: one line per terminal PayeeLink/PayerLink
//! outcome, written by the node loop's housekeeping step once a link reaches
//! a terminal phase (§4.7).
use std::{
	fs::OpenOptions,
	io::Write,
	path::Path,
};

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

use crate::errors::PersistenceError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PayLogRole {
	Payer,
	Payee,
}

/// One terminal outcome, ready to be serialized as a single JSON line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayLogEntry {
	pub request_id: RequestId,
	pub role: PayLogRole,
	pub amount: Amount,
	pub receipt: String,
	pub transaction_id: Option<TransactionId>,
	pub phase: String,
	pub recorded_at: Timestamp,
}

/// A handle to the log file, opened once and kept append-only for the
/// lifetime of the node.
pub struct PayLog {
	file: std::fs::File,
}

impl PayLog {
	pub fn open(path: &Path) -> Result<Self, PersistenceError> {
		let file = OpenOptions::new().create(true).append(true).open(path).map_err(|source| PersistenceError::io(path, source))?;
		Ok(Self { file })
	}

	/// Appends one entry as a single JSON line, flushing before returning so a
	/// later crash cannot silently drop a recorded outcome.
	pub fn append(&mut self, entry: &PayLogEntry) -> Result<(), PersistenceError> {
		let mut line = serde_json::to_vec(entry)?;
		line.push(b'\n');
		self.file.write_all(&line).map_err(|source| PersistenceError::io(Path::new("<paylog>"), source))?;
		self.file.flush().map_err(|source| PersistenceError::io(Path::new("<paylog>"), source))?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::BufRead;

	use super::*;

	#[test]
	fn appends_are_newline_delimited_json() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("paylog.jsonl");

		let mut log = PayLog::open(&path).unwrap();
		log.append(&PayLogEntry {
			request_id: RequestId("req-1".to_string()),
			role: PayLogRole::Payee,
			amount: 500,
			receipt: "coffee".to_string(),
			transaction_id: None,
			phase: "Committed".to_string(),
			recorded_at: 100,
		})
		.unwrap();
		log.append(&PayLogEntry {
			request_id: RequestId("req-2".to_string()),
			role: PayLogRole::Payer,
			amount: 10,
			receipt: "tip".to_string(),
			transaction_id: None,
			phase: "Cancelled".to_string(),
			recorded_at: 101,
		})
		.unwrap();
		drop(log);

		let lines: Vec<String> = std::io::BufReader::new(std::fs::File::open(&path).unwrap()).lines().map(|l| l.unwrap()).collect();
		assert_eq!(lines.len(), 2);
		let first: PayLogEntry = serde_json::from_str(&lines[0]).unwrap();
		assert_eq!(first.request_id, RequestId("req-1".to_string()));
		assert_eq!(first.amount, 500);
	}

	#[test]
	fn reopening_appends_rather_than_truncates() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("paylog.jsonl");

		PayLog::open(&path)
			.unwrap()
			.append(&PayLogEntry { request_id: RequestId("req-1".to_string()), role: PayLogRole::Payee, amount: 1, receipt: "a".to_string(), transaction_id: None, phase: "Committed".to_string(), recorded_at: 0 })
			.unwrap();
		PayLog::open(&path)
			.unwrap()
			.append(&PayLogEntry { request_id: RequestId("req-2".to_string()), role: PayLogRole::Payee, amount: 2, receipt: "b".to_string(), transaction_id: None, phase: "Committed".to_string(), recorded_at: 1 })
			.unwrap();

		let lines: Vec<String> = std::io::BufReader::new(std::fs::File::open(&path).unwrap()).lines().map(|l| l.unwrap()).collect();
		assert_eq!(lines.len(), 2);
	}
}
