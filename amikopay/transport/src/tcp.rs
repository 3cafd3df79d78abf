//! Plain TCP transport: one fresh connection per outgoing send, and a
//! listener that spawns a reader task per inbound connection. No retry
//! queueing or backoff: a connection-oriented transport that dials fresh
//! per message does not need one — a failed `send` simply returns an
//! error for the caller to retry.
use amikopay_messages::Envelope;
use async_trait::async_trait;
use tokio::{
	net::{
		TcpListener,
		TcpStream,
	},
	sync::mpsc::UnboundedSender,
};
use tracing::{
	debug,
	error,
	info,
};

use crate::{
	codec::{
		read_envelope,
		write_envelope,
	},
	errors::TransportError,
	config::TransportConfig,
	Transport,
};

pub struct TcpTransport {
	config: TransportConfig,
}

impl TcpTransport {
	pub fn new(config: TransportConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl Transport for TcpTransport {
	async fn init(&self) -> Result<(), TransportError> {
		// Binding happens in `process`, which owns the listener's lifetime;
		// nothing to validate ahead of time beyond the config itself.
		Ok(())
	}

	async fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
		let addr = self.config.peers.get(&envelope.recipient).ok_or_else(|| TransportError::UnknownPeer(envelope.recipient.clone()))?;
		let mut stream = TcpStream::connect(addr).await?;
		write_envelope(&mut stream, &envelope).await?;
		debug!(recipient = %envelope.recipient, %addr, "envelope sent");
		Ok(())
	}

	async fn process(&self, inbox: UnboundedSender<Envelope>) -> Result<(), TransportError> {
		let listener = TcpListener::bind(self.config.listen_address).await?;
		info!(address = %self.config.listen_address, "transport listening");

		loop {
			let (mut stream, peer_addr) = listener.accept().await?;
			let inbox = inbox.clone();
			tokio::spawn(async move {
				loop {
					match read_envelope(&mut stream).await {
						Ok(envelope) => {
							if inbox.send(envelope).is_err() {
								debug!(%peer_addr, "inbox closed, dropping connection");
								return
							}
						},
						Err(err) => {
							debug!(%peer_addr, error = %err, "connection closed");
							return
						},
					}
				}
			});
		}
	}
}
