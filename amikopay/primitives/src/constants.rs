/// Number of random bytes used to derive a `RequestId`.
///
/// §6: "`requestID` is 16 hex chars (8 random bytes)".
pub const REQUEST_ID_BYTES: usize = 8;

/// Number of random bytes in a payment `Token` (the secret preimage).
///
/// §6: "`token` is 32 cryptographically-random bytes".
pub const TOKEN_BYTES: usize = 32;

/// Byte length of a `TransactionId` (`RIPEMD160(SHA256(token))` digest).
pub const TRANSACTION_ID_BYTES: usize = 20;

/// Reserved local id used by a Link to address the payer side of a payment.
///
/// §6: "`payerLocalID = \"__payer__\"`".
pub const PAYER_LOCAL_ID: &str = "__payer__";

/// Byte length of a serialized Transaction Conditions Document.
pub const TCD_BYTES: usize = 84;

/// URL scheme for payment requests.
pub const URL_SCHEME: &str = "amikopay";
