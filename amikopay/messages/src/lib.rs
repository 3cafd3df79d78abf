//! The closed set of protocol message variants exchanged between nodes
//! (§6), the on-wire Transaction Conditions Document (§6), and the
//! `amikopay://` payment URL (§6).
//!
//! Wire framing (how bytes become a `Message`) is explicitly out of scope
//! for this crate (§1): it only defines the catalog and its JSON/binary
//! encodings. An abstract `Transport` (see `amikopay-transport`) is
//! responsible for delivering `Envelope`s between nodes.

/// The message catalog.
pub mod catalog;
/// Transaction Conditions Document wire format.
pub mod tcd;
/// The `amikopay://` payment URL.
pub mod url;

pub use catalog::*;
pub use tcd::Tcd;
pub use url::PaymentUrl;
