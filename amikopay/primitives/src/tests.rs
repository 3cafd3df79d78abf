use crate::{
	hashing::transaction_id_of,
	types::Token,
};

#[test]
fn transaction_id_is_deterministic() {
	let token = Token([7u8; 32]);
	let a = transaction_id_of(&token);
	let b = transaction_id_of(&token);
	assert_eq!(a, b);
}

#[test]
fn distinct_tokens_yield_distinct_transaction_ids() {
	let a = transaction_id_of(&Token([1u8; 32]));
	let b = transaction_id_of(&Token([2u8; 32]));
	assert_ne!(a, b);
}

#[test]
fn transaction_id_round_trips_through_json() {
	let token = Token::random();
	let id = transaction_id_of(&token);
	let encoded = serde_json::to_string(&id).unwrap();
	let decoded: crate::types::TransactionId = serde_json::from_str(&encoded).unwrap();
	assert_eq!(id, decoded);
}

#[test]
fn request_ids_are_sixteen_hex_chars() {
	let id = crate::types::RequestId::random();
	assert_eq!(id.0.len(), 16);
	assert!(id.0.chars().all(|c| c.is_ascii_hexdigit()));
}
