//! Delivers `Envelope`s between independently-owned nodes. The state
//! machine and node loop only depend on the `Transport` trait; this crate
//! supplies a length-prefixed JSON-over-TCP implementation plus an
//! in-memory one for tests, since wire framing itself is explicitly out of
//! scope for `amikopay-messages` and `amikopay-state-machine`.
pub mod codec;
pub mod config;
pub mod errors;
pub mod memory;
pub mod tcp;

use amikopay_messages::Envelope;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

pub use config::TransportConfig;
pub use errors::TransportError;
pub use memory::InMemoryTransport;
pub use tcp::TcpTransport;

/// A running transport: something that can deliver outgoing `Envelope`s and
/// feed incoming ones into an inbox for the node loop to drain.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Performs whatever setup is needed before `send`/`process` may be
	/// called (binding a listen socket, connecting to a broker, ...).
	async fn init(&self) -> Result<(), TransportError>;

	/// Delivers one outgoing envelope to the peer addressed by
	/// `envelope.recipient`.
	async fn send(&self, envelope: Envelope) -> Result<(), TransportError>;

	/// Runs until the transport is closed, forwarding every envelope it
	/// receives into `inbox`. Takes `&self` rather than consuming the
	/// transport so a caller can hold it in an `Arc` and keep calling `send`
	/// from elsewhere while this runs as a background task.
	async fn process(&self, inbox: UnboundedSender<Envelope>) -> Result<(), TransportError>;
}
