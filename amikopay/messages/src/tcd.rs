//! The Transaction Conditions Document (§6): an 84-byte, big-endian,
//! on-wire description of an HTLC-equivalent commitment, used by
//! `TCD`-backed channels. On-chain enforcement of a TCD is delegated to the
//! `SettlementBackend` collaborator (§1); this crate only (de)serializes
//! the document.
use amikopay_primitives::{
	constants::TCD_BYTES,
	types::{
		Amount,
		Timestamp,
	},
};
use thiserror::Error;

/// Errors that can occur while decoding a TCD or a list of TCDs.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum TcdError {
	#[error("Transaction Conditions Document must be exactly {TCD_BYTES} bytes, got {0}")]
	WrongLength(usize),
	#[error("a list of Transaction Conditions Documents must have a length that is a multiple of {TCD_BYTES}, got {0}")]
	NotAMultipleOfDocumentLength(usize),
}

/// A single Transaction Conditions Document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tcd {
	pub start_time: Timestamp,
	pub end_time: Timestamp,
	pub amount: Amount,
	pub token_hash: [u8; 20],
	pub commit_address: [u8; 20],
	pub rollback_address: [u8; 20],
}

impl Tcd {
	/// Serializes this document into its 84-byte big-endian wire form.
	pub fn serialize(&self) -> [u8; TCD_BYTES] {
		let mut out = [0u8; TCD_BYTES];
		out[0..8].copy_from_slice(&self.start_time.to_be_bytes());
		out[8..16].copy_from_slice(&self.end_time.to_be_bytes());
		out[16..24].copy_from_slice(&self.amount.to_be_bytes());
		out[24..44].copy_from_slice(&self.token_hash);
		out[44..64].copy_from_slice(&self.commit_address);
		out[64..84].copy_from_slice(&self.rollback_address);
		out
	}

	/// Deserializes a single document from exactly `TCD_BYTES` bytes.
	pub fn deserialize(data: &[u8]) -> Result<Self, TcdError> {
		if data.len() != TCD_BYTES {
			return Err(TcdError::WrongLength(data.len()))
		}
		let mut start_time_bytes = [0u8; 8];
		start_time_bytes.copy_from_slice(&data[0..8]);
		let mut end_time_bytes = [0u8; 8];
		end_time_bytes.copy_from_slice(&data[8..16]);
		let mut amount_bytes = [0u8; 8];
		amount_bytes.copy_from_slice(&data[16..24]);
		let mut token_hash = [0u8; 20];
		token_hash.copy_from_slice(&data[24..44]);
		let mut commit_address = [0u8; 20];
		commit_address.copy_from_slice(&data[44..64]);
		let mut rollback_address = [0u8; 20];
		rollback_address.copy_from_slice(&data[64..84]);

		Ok(Tcd {
			start_time: u64::from_be_bytes(start_time_bytes),
			end_time: u64::from_be_bytes(end_time_bytes),
			amount: u64::from_be_bytes(amount_bytes),
			token_hash,
			commit_address,
			rollback_address,
		})
	}

	/// Serializes a list of documents as a concatenation of their wire forms.
	pub fn serialize_list(docs: &[Tcd]) -> Vec<u8> {
		let mut out = Vec::with_capacity(docs.len() * TCD_BYTES);
		for doc in docs {
			out.extend_from_slice(&doc.serialize());
		}
		out
	}

	/// Deserializes a concatenated list of documents. Fails unless `data`'s
	/// length is a multiple of `TCD_BYTES` (§6).
	pub fn deserialize_list(data: &[u8]) -> Result<Vec<Tcd>, TcdError> {
		if data.len() % TCD_BYTES != 0 {
			return Err(TcdError::NotAMultipleOfDocumentLength(data.len()))
		}
		data.chunks(TCD_BYTES).map(Tcd::deserialize).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Tcd {
		Tcd {
			start_time: 1_000,
			end_time: 2_000,
			amount: 123_456,
			token_hash: [1u8; 20],
			commit_address: [2u8; 20],
			rollback_address: [3u8; 20],
		}
	}

	#[test]
	fn round_trips_a_single_document() {
		let doc = sample();
		let bytes = doc.serialize();
		assert_eq!(bytes.len(), TCD_BYTES);
		assert_eq!(Tcd::deserialize(&bytes).unwrap(), doc);
	}

	#[test]
	fn round_trips_a_list() {
		let docs = vec![sample(), sample(), sample()];
		let bytes = Tcd::serialize_list(&docs);
		assert_eq!(bytes.len(), 3 * TCD_BYTES);
		assert_eq!(Tcd::deserialize_list(&bytes).unwrap(), docs);
	}

	#[test]
	fn rejects_a_length_that_is_not_a_multiple_of_84() {
		let bytes = vec![0u8; TCD_BYTES + 1];
		assert_eq!(Tcd::deserialize_list(&bytes), Err(TcdError::NotAMultipleOfDocumentLength(85)));
	}

	#[test]
	fn rejects_a_single_document_of_the_wrong_length() {
		let bytes = vec![0u8; TCD_BYTES - 1];
		assert_eq!(Tcd::deserialize(&bytes), Err(TcdError::WrongLength(83)));
	}

	#[test]
	fn big_endian_amount_is_preserved() {
		let doc = sample();
		let bytes = doc.serialize();
		assert_eq!(u64::from_be_bytes(bytes[16..24].try_into().unwrap()), 123_456);
	}
}
