//! Tunables for the routing/payment state machine (§4, §9).

use amikopay_primitives::types::Timestamp;

/// Default lifetime of a payment request's `Receipt`, in seconds, when the
/// payee does not specify one explicitly (§6, "open question": the source
/// leaves receipt expiry unspecified; this implementation picks one hour).
pub const DEFAULT_RECEIPT_LIFETIME: Timestamp = 3600;

/// Maximum number of channels considered per Link when selecting one with
/// enough spare capacity to route a payment (§4.2, "ordered list of
/// Channel"). Bounds routing cost on Links with many parallel channels.
pub const MAX_CHANNELS_CONSIDERED_PER_LINK: usize = 64;

/// How long a PayerLink waits for `Receipt` before timing out (§4.6
/// `initial + Timeout(initial)`).
pub const PAYER_INITIAL_TIMEOUT: Timestamp = 30;

/// How long a MeetingPoint holds one side of a flood before discarding it as
/// stale and cascading a cancellation back toward whoever sent it (§4.4).
pub const MEETING_POINT_PENDING_TIMEOUT: Timestamp = 60;
