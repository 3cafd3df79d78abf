//! Double-hashing used throughout the protocol: `transactionID =
//! RIPEMD160(SHA256(token))` (§6, §8).
use ripemd::Ripemd160;
use sha2::{
	Digest,
	Sha256,
};

use crate::types::{
	Token,
	TransactionId,
};

/// Derives a `transactionID` from a payment `token` (the secret preimage).
///
/// This is the single place in the codebase allowed to compute this
/// relationship; every other module treats `TransactionId` as opaque.
pub fn transaction_id_of(token: &Token) -> TransactionId {
	let sha = Sha256::digest(token.as_bytes());
	let ripe = Ripemd160::digest(sha);
	let mut bytes = [0u8; 20];
	bytes.copy_from_slice(&ripe);
	TransactionId(bytes)
}
