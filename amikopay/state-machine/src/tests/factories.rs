//! Test-only scaffolding: building a `NodeState` with a Link/channel already
//! attached, and a `Network` that plays the role of the not-yet-built
//! `amikopay-transport` by delivering `SendEnvelope` events between
//! independently-owned nodes.
use std::collections::{
	HashMap,
	VecDeque,
};

use amikopay_messages::Envelope;
use amikopay_primitives::types::{
	Amount,
	LinkName,
	LocalId,
	Timestamp,
};

use crate::{
	machine::state_transition,
	types::{
		event::SendEnvelope,
		state_change::{
			ChannelOpened,
			LinkCreated,
			MessageReceived,
		},
		ChannelVariant,
		Event,
		NodeState,
		StateChange,
	},
};

/// A `NodeState` with one Link already registered under `local_id`, and
/// optionally one `Plain` channel on it with the given local/remote balance.
pub fn node_with_link(link_name: &str, local_id: &str, remote_id: &str, channel: Option<(Amount, Amount)>) -> NodeState {
	let mut state = NodeState::new();
	add_link(&mut state, link_name, local_id, remote_id, channel);
	state
}

/// Registers another Link (and optionally a `Plain` channel on it) on an
/// already-existing node, for scenarios where one node has several
/// neighbours.
pub fn add_link(state: &mut NodeState, link_name: &str, local_id: &str, remote_id: &str, channel: Option<(Amount, Amount)>) {
	state_transition(
		state,
		StateChange::LinkCreated(LinkCreated {
			name: LinkName(link_name.to_string()),
			local_id: LocalId(local_id.to_string()),
			remote_id: LocalId(remote_id.to_string()),
			remote_url: None,
		}),
		0,
	)
	.expect("LinkCreated never fails");

	if let Some((amount_local, amount_remote)) = channel {
		state_transition(
			state,
			StateChange::ChannelOpened(ChannelOpened { link: LocalId(local_id.to_string()), variant: ChannelVariant::Plain, amount_local, amount_remote }),
			0,
		)
		.expect("ChannelOpened never fails for a link just created");
	}
}

/// Routes `SendEnvelope` events between independently-owned `NodeState`s,
/// rewriting each envelope's `recipient` from the sender's own local id for
/// the link to the receiver's local id for the same link — the address
/// translation a real transport performs, kept out of this crate because it
/// involves I/O.
#[derive(Default)]
pub struct Network {
	routes: HashMap<(&'static str, LocalId), (&'static str, LocalId)>,
}

impl Network {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers both directions of one bilateral Link at once.
	pub fn link(&mut self, a: &'static str, a_id: &str, b: &'static str, b_id: &str) {
		self.routes.insert((a, LocalId(a_id.to_string())), (b, LocalId(b_id.to_string())));
		self.routes.insert((b, LocalId(b_id.to_string())), (a, LocalId(a_id.to_string())));
	}

	/// Drains `queue`, delivering every `SendEnvelope` to its addressed peer
	/// and folding the events that produces back into the queue. Returns
	/// every non-`SendEnvelope` event, tagged with the node that raised it,
	/// once the network has gone quiet.
	pub fn drive(&self, nodes: &mut HashMap<&'static str, NodeState>, now: Timestamp, mut queue: VecDeque<(&'static str, Event)>) -> Vec<(&'static str, Event)> {
		let mut terminal = Vec::new();
		while let Some((from, event)) = queue.pop_front() {
			match event {
				Event::SendEnvelope(SendEnvelope { envelope: Envelope { recipient, message } }) => {
					let (to_node, to_local) = self
						.routes
						.get(&(from, recipient.clone()))
						.unwrap_or_else(|| panic!("no route registered for {from}/{recipient}"))
						.clone();
					let inbound = Envelope { recipient: to_local, message };
					let state = nodes.get_mut(to_node).expect("destination node registered with the network");
					let events = state_transition(state, StateChange::MessageReceived(MessageReceived { envelope: inbound }), now)
						.unwrap_or_else(|err| panic!("delivery from {from} to {to_node} failed: {err}"));
					queue.extend(events.into_iter().map(|event| (to_node, event)));
				}
				other => terminal.push((from, other)),
			}
		}
		terminal
	}
}
