//! An in-process `Transport` for tests: `send` hands the envelope straight
//! to the addressed peer's inbox channel instead of going over a socket.
//! Plays the same role as the `Network` test helper in
//! `amikopay-state-machine`, but as a real `Transport` implementation so
//! `amikopay-node` integration tests can exercise the full node loop without
//! a TCP stack.
use std::{
	collections::HashMap,
	sync::Mutex,
};

use amikopay_messages::Envelope;
use amikopay_primitives::types::LocalId;
use async_trait::async_trait;
use tokio::sync::mpsc::{
	self,
	UnboundedReceiver,
	UnboundedSender,
};

use crate::{
	errors::TransportError,
	Transport,
};

pub struct InMemoryTransport {
	/// This node's own local id for a Link, to the peer's local id for the
	/// same Link and the peer's inbox sender — the address translation a
	/// real transport performs at the socket boundary.
	routes: HashMap<LocalId, (LocalId, UnboundedSender<Envelope>)>,
	incoming: Mutex<Option<UnboundedReceiver<Envelope>>>,
}

impl InMemoryTransport {
	/// Creates a transport with no routes yet, returning the sender peers
	/// should be given (via `connect`) to address envelopes to it.
	pub fn new() -> (Self, UnboundedSender<Envelope>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { routes: HashMap::new(), incoming: Mutex::new(Some(rx)) }, tx)
	}

	/// Registers the peer reachable through `local_id`: envelopes addressed
	/// to `local_id` are forwarded to `remote_inbox`, relabelled with
	/// `remote_id` (the peer's own local id for the same Link).
	pub fn connect(&mut self, local_id: LocalId, remote_id: LocalId, remote_inbox: UnboundedSender<Envelope>) {
		self.routes.insert(local_id, (remote_id, remote_inbox));
	}
}

#[async_trait]
impl Transport for InMemoryTransport {
	async fn init(&self) -> Result<(), TransportError> {
		Ok(())
	}

	async fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
		let (remote_id, remote_inbox) = self.routes.get(&envelope.recipient).ok_or_else(|| TransportError::UnknownPeer(envelope.recipient.clone()))?;
		let relabelled = Envelope { recipient: remote_id.clone(), message: envelope.message };
		remote_inbox.send(relabelled).map_err(|_| TransportError::Closed)
	}

	async fn process(&self, inbox: UnboundedSender<Envelope>) -> Result<(), TransportError> {
		let mut receiver = self.incoming.lock().expect("transport mutex poisoned").take().ok_or(TransportError::Closed)?;
		while let Some(envelope) = receiver.recv().await {
			if inbox.send(envelope).is_err() {
				return Err(TransportError::Closed)
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use amikopay_messages::{
		Message,
		PayeeCancel,
	};

	use super::*;

	#[tokio::test]
	async fn delivers_envelopes_relabelled_for_the_receiver() {
		let (mut alice, _alice_tx) = InMemoryTransport::new();
		let (bob, bob_tx) = InMemoryTransport::new();

		alice.connect(LocalId("alice->bob".to_string()), LocalId("bob->alice".to_string()), bob_tx);

		let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel();
		tokio::spawn(async move {
			bob.process(inbox_tx).await.unwrap();
		});

		alice.send(Envelope::new(LocalId("alice->bob".to_string()), Message::PayeeCancel(PayeeCancel))).await.unwrap();

		let received = inbox_rx.recv().await.unwrap();
		assert_eq!(received.recipient, LocalId("bob->alice".to_string()));
	}

	#[tokio::test]
	async fn sending_to_an_unregistered_peer_fails() {
		let (alice, _tx) = InMemoryTransport::new();
		let result = alice.send(Envelope::new(LocalId("alice->nobody".to_string()), Message::PayeeCancel(PayeeCancel))).await;
		assert!(matches!(result, Err(TransportError::UnknownPeer(_))));
	}
}
