#![allow(clippy::module_inception)]
//! Base identifier and amount types used across the workspace. Most of these
//! are thin newtypes around byte arrays or integers; keeping them distinct
//! types (rather than bare `u64`/`String`) stops channel amounts, request ids
//! and transaction ids from being accidentally interchanged at call sites.

use std::fmt;

use rand::RngCore;
use serde::{
	Deserialize,
	Serialize,
};

use crate::constants::{
	REQUEST_ID_BYTES,
	TOKEN_BYTES,
	TRANSACTION_ID_BYTES,
};

/// An amount of settlement-layer value held or moved on a channel.
///
/// Amounts are plain non-negative integers (§3); a real deployment would
/// tie this to a settlement layer's native unit (e.g. satoshis), which is
/// why this stays a bare integer rather than a fixed-point decimal.
pub type Amount = u64;

/// Absolute time, in seconds since the Unix epoch. Used for `startTime`,
/// `endTime` on routes and TCDs (§6), and for timer deadlines (§4.7, §9).
pub type Timestamp = u64;

/// The secret 32-byte preimage whose hash is a payment's `transactionID`
/// (§6, GLOSSARY). Revealed by `Commit` to atomically settle a payment.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Token(#[serde(with = "hex_bytes")] pub [u8; TOKEN_BYTES]);

impl Token {
	/// Generates a new cryptographically-random token.
	pub fn random() -> Self {
		let mut bytes = [0u8; TOKEN_BYTES];
		rand::rngs::OsRng.fill_bytes(&mut bytes);
		Token(bytes)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Token({}...)", &hex::encode(&self.0[..4]))
	}
}

/// A payment's identity: `RIPEMD160(SHA256(token))` (§6). Derived once and
/// immutable for the lifetime of a PayeeLink/PayerLink/Transaction (§3).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransactionId(#[serde(with = "hex_bytes")] pub [u8; TRANSACTION_ID_BYTES]);

impl fmt::Debug for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TransactionId({})", hex::encode(self.0))
	}
}

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode(self.0))
	}
}

/// A non-secret random correlator for a pending payment request (§3, §6).
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
	/// Generates a new non-secure random request id (it is not secret, only
	/// semi-unique — §6, original `node.py`'s `msg_request`).
	pub fn random() -> Self {
		let mut bytes = [0u8; REQUEST_ID_BYTES];
		rand::thread_rng().fill_bytes(&mut bytes);
		RequestId(hex::encode(bytes))
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl fmt::Debug for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RequestId({})", self.0)
	}
}

/// A Link endpoint handle: either the reserved payer pseudo-id or a
/// per-Link local id assigned by a node (§3, GLOSSARY).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LocalId(pub String);

impl LocalId {
	/// The reserved local id that addresses the payer side of a payment
	/// (§6: `payerLocalID = "__payer__"`).
	pub fn payer() -> Self {
		LocalId(crate::constants::PAYER_LOCAL_ID.to_string())
	}

	pub fn is_payer(&self) -> bool {
		self.0 == crate::constants::PAYER_LOCAL_ID
	}
}

impl fmt::Display for LocalId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The name an operator gives to a Link when creating it (§6: `makeLink`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LinkName(pub String);

impl fmt::Display for LinkName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identity of a mutually-trusted meeting point (§3, GLOSSARY).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MeetingPointId(pub String);

impl fmt::Display for MeetingPointId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identity of a channel within a Link's ordered channel list (§3).
pub type ChannelIndex = usize;

mod hex_bytes {
	use serde::{
		Deserialize,
		Deserializer,
		Serializer,
	};

	pub fn serialize<S: Serializer, const N: usize>(
		bytes: &[u8; N],
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&hex::encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
		deserializer: D,
	) -> Result<[u8; N], D::Error> {
		let s = String::deserialize(deserializer)?;
		let decoded = hex::decode(&s).map_err(serde::de::Error::custom)?;
		if decoded.len() != N {
			return Err(serde::de::Error::custom(format!(
				"expected {} bytes, got {}",
				N,
				decoded.len()
			)))
		}
		let mut out = [0u8; N];
		out.copy_from_slice(&decoded);
		Ok(out)
	}
}
