//! End-to-end scenarios driven through `state_transition`, with `Network`
//! standing in for the transport between independently-owned nodes.
use std::collections::{
	HashMap,
	VecDeque,
};

use amikopay_primitives::types::{
	LocalId,
	MeetingPointId,
	RequestId,
};

use crate::{
	errors::StateTransitionError,
	machine::state_transition,
	tests::factories::{
		add_link,
		node_with_link,
		Network,
	},
	types::{
		state_change::{
			PaymentConfirmed,
			PaymentDeclined,
			PaymentInitiated,
			PaymentRequested,
		},
		Event,
		MeetingPointState,
		NodeState,
		PayeeLinkPhase,
		PayerLinkPhase,
		StateChange,
	},
	views,
};

const MP: &str = "mp1";

fn three_node_topology() -> (NodeState, NodeState, NodeState) {
	// alice (payer) and carol (payee) each hold a channel to router, plus a
	// channel-less Link straight to each other for Pay/Receipt/Confirm.
	let mut alice = node_with_link("alice-router", "alice->router", "router->alice", Some((1000, 1000)));
	add_link(&mut alice, "alice-carol", "alice->carol", "carol->alice", None);

	let carol = node_with_link("carol-router", "carol->router", "router->carol", Some((1000, 1000)));

	let mut router = node_with_link("router-alice", "router->alice", "alice->router", Some((1000, 1000)));
	add_link(&mut router, "router-carol", "router->carol", "carol->router", Some((1000, 1000)));
	router.meeting_points.insert(MeetingPointId(MP.to_string()), MeetingPointState::new(MeetingPointId(MP.to_string())));

	(alice, router, carol)
}

fn network() -> Network {
	let mut network = Network::new();
	network.link("alice", "alice->router", "router", "router->alice");
	network.link("carol", "carol->router", "router", "router->carol");
	network.link("alice", "alice->carol", "carol", "carol->alice");
	network
}

#[test]
fn full_payment_settles_through_a_meeting_point() {
	let (mut alice, router, mut carol) = three_node_topology();
	let network = network();

	let request_id = RequestId("req-1".to_string());
	state_transition(
		&mut carol,
		StateChange::PaymentRequested(PaymentRequested {
			request_id: request_id.clone(),
			amount: 500,
			receipt: "coffee".to_string(),
			candidate_meeting_points: vec![MeetingPointId(MP.to_string())],
			requested_at: 0,
		}),
		0,
	)
	.expect("request never fails");

	let pay_events = state_transition(
		&mut alice,
		StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link: LocalId("alice->carol".to_string()), amount: 500 }),
		0,
	)
	.expect("pay never fails given a registered Link");

	let mut nodes: HashMap<&'static str, NodeState> = HashMap::new();
	nodes.insert("alice", alice);
	nodes.insert("router", router);
	nodes.insert("carol", carol);

	let queue: VecDeque<(&'static str, Event)> = pay_events.into_iter().map(|event| ("alice", event)).collect();
	let terminal = network.drive(&mut nodes, 0, queue);

	// Receipt has landed: confirm the payment, nominating the shared meeting
	// point, and let the resulting Confirm/MakeRoute flood run to completion.
	let alice_state = nodes.get_mut("alice").unwrap();
	let confirm_events =
		state_transition(alice_state, StateChange::PaymentConfirmed(PaymentConfirmed { request_id: request_id.clone(), meeting_point_id: MeetingPointId(MP.to_string()) }), 0)
			.expect("confirmPayment succeeds once a route exists");
	let queue: VecDeque<(&'static str, Event)> = confirm_events.into_iter().map(|event| ("alice", event)).collect();
	let mut terminal2 = network.drive(&mut nodes, 0, queue);
	let mut all_terminal = terminal;
	all_terminal.append(&mut terminal2);

	let settled = all_terminal.iter().find_map(|(_, event)| match event {
		Event::PaymentSettled(settled) if settled.request_id == request_id => Some(settled.clone()),
		_ => None,
	});
	let settled = settled.expect("the payee's deliver_lock must emit PaymentSettled");
	assert_eq!(settled.amount, 500);

	let alice_state = nodes.get("alice").unwrap();
	let carol_state = nodes.get("carol").unwrap();
	let router_state = nodes.get("router").unwrap();

	assert!(views::payer_request_is_settled(alice_state, &request_id));
	let alice_payer_link = alice_state.payer_links.get(&request_id).unwrap();
	assert_eq!(alice_payer_link.phase, PayerLinkPhase::Committed);

	let carol_request_id = carol_state.payee_links.keys().next().cloned().expect("carol has exactly one payee link");
	assert!(views::payee_request_is_settled(carol_state, &carol_request_id));
	assert_eq!(carol_state.payee_links.get(&carol_request_id).unwrap().phase, PayeeLinkPhase::Committed);

	let alice_channel = &alice_state.links.get(&LocalId("alice->router".to_string())).unwrap().channels[0];
	assert_eq!(alice_channel.amount_local, 500);
	assert_eq!(alice_channel.amount_remote, 1500);

	let carol_channel = &carol_state.links.get(&LocalId("carol->router".to_string())).unwrap().channels[0];
	assert_eq!(carol_channel.amount_local, 1500);
	assert_eq!(carol_channel.amount_remote, 500);

	// The meeting point itself never held settlement capacity for this
	// transaction: it only rendezvoused the two floods.
	assert_eq!(views::in_flight_transaction_count(alice_state), 0);
	assert_eq!(views::in_flight_transaction_count(carol_state), 0);
	assert_eq!(views::in_flight_transaction_count(router_state), 0);
}

fn five_node_topology() -> (NodeState, NodeState, NodeState, NodeState, NodeState) {
	// alice (payer) -- bob -- router (meeting point) -- dave -- carol (payee),
	// plus the channel-less alice<->carol Link for Pay/Receipt/Confirm. The
	// meeting point sits two hops from both endpoints, so HavePayerRoute and
	// HavePayeeRoute must each relay through an intermediate link.
	let mut alice = node_with_link("alice-bob", "alice->bob", "bob->alice", Some((1000, 1000)));
	add_link(&mut alice, "alice-carol", "alice->carol", "carol->alice", None);

	let mut bob = node_with_link("bob-alice", "bob->alice", "alice->bob", Some((1000, 1000)));
	add_link(&mut bob, "bob-router", "bob->router", "router->bob", Some((1000, 1000)));

	let mut router = node_with_link("router-bob", "router->bob", "bob->router", Some((1000, 1000)));
	add_link(&mut router, "router-dave", "router->dave", "dave->router", Some((1000, 1000)));
	router.meeting_points.insert(MeetingPointId(MP.to_string()), MeetingPointState::new(MeetingPointId(MP.to_string())));

	let mut dave = node_with_link("dave-router", "dave->router", "router->dave", Some((1000, 1000)));
	add_link(&mut dave, "dave-carol", "dave->carol", "carol->dave", Some((1000, 1000)));

	let carol = node_with_link("carol-dave", "carol->dave", "dave->carol", Some((1000, 1000)));

	(alice, bob, router, dave, carol)
}

fn five_node_network() -> Network {
	let mut network = Network::new();
	network.link("alice", "alice->bob", "bob", "bob->alice");
	network.link("bob", "bob->router", "router", "router->bob");
	network.link("router", "router->dave", "dave", "dave->router");
	network.link("dave", "dave->carol", "carol", "carol->dave");
	network.link("alice", "alice->carol", "carol", "carol->alice");
	network
}

#[test]
fn full_payment_settles_through_a_meeting_point_two_hops_from_each_endpoint() {
	let (mut alice, bob, router, dave, mut carol) = five_node_topology();
	let network = five_node_network();

	let request_id = RequestId("req-multihop".to_string());
	state_transition(
		&mut carol,
		StateChange::PaymentRequested(PaymentRequested {
			request_id: request_id.clone(),
			amount: 200,
			receipt: "book".to_string(),
			candidate_meeting_points: vec![MeetingPointId(MP.to_string())],
			requested_at: 0,
		}),
		0,
	)
	.expect("request never fails");

	let pay_events = state_transition(
		&mut alice,
		StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link: LocalId("alice->carol".to_string()), amount: 200 }),
		0,
	)
	.expect("pay never fails given a registered Link");

	let mut nodes: HashMap<&'static str, NodeState> = HashMap::new();
	nodes.insert("alice", alice);
	nodes.insert("bob", bob);
	nodes.insert("router", router);
	nodes.insert("dave", dave);
	nodes.insert("carol", carol);

	let queue: VecDeque<(&'static str, Event)> = pay_events.into_iter().map(|event| ("alice", event)).collect();
	let terminal = network.drive(&mut nodes, 0, queue);

	let alice_state = nodes.get_mut("alice").unwrap();
	let confirm_events =
		state_transition(alice_state, StateChange::PaymentConfirmed(PaymentConfirmed { request_id: request_id.clone(), meeting_point_id: MeetingPointId(MP.to_string()) }), 0)
			.expect("confirmPayment succeeds once a route exists");
	let queue: VecDeque<(&'static str, Event)> = confirm_events.into_iter().map(|event| ("alice", event)).collect();
	let mut terminal2 = network.drive(&mut nodes, 0, queue);
	let mut all_terminal = terminal;
	all_terminal.append(&mut terminal2);

	let settled = all_terminal.iter().find_map(|(_, event)| match event {
		Event::PaymentSettled(settled) if settled.request_id == request_id => Some(settled.clone()),
		_ => None,
	});
	let settled = settled.expect("relaying HavePayerRoute/HavePayeeRoute through bob and dave must still reach deliver_lock");
	assert_eq!(settled.amount, 200);

	let alice_state = nodes.get("alice").unwrap();
	let carol_state = nodes.get("carol").unwrap();
	let bob_state = nodes.get("bob").unwrap();
	let dave_state = nodes.get("dave").unwrap();

	assert!(views::payer_request_is_settled(alice_state, &request_id));
	assert_eq!(alice_state.payer_links.get(&request_id).unwrap().phase, PayerLinkPhase::Committed);

	let carol_request_id = carol_state.payee_links.keys().next().cloned().expect("carol has exactly one payee link");
	assert!(views::payee_request_is_settled(carol_state, &carol_request_id));
	assert_eq!(carol_state.payee_links.get(&carol_request_id).unwrap().phase, PayeeLinkPhase::Committed);

	// The intermediate hops relayed the route messages and then released their
	// own reservations once SettleCommit passed through.
	assert_eq!(views::in_flight_transaction_count(bob_state), 0);
	assert_eq!(views::in_flight_transaction_count(dave_state), 0);
}

#[test]
fn confirm_payment_fails_without_enough_capacity_towards_any_neighbour() {
	// alice only has the channel-less Link to carol: there is no Link with a
	// channel at all, so no flood candidate exists.
	let mut alice = NodeState::new();
	add_link(&mut alice, "alice-carol", "alice->carol", "carol->alice", None);

	let request_id = RequestId("req-2".to_string());
	state_transition(
		&mut alice,
		StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link: LocalId("alice->carol".to_string()), amount: 10 }),
		0,
	)
	.expect("pay still succeeds — no routing has happened yet");

	// Fabricate the AwaitingConfirmation state a real Receipt exchange would
	// have produced, to isolate the routing failure from the handshake.
	{
		let payer_link = alice.payer_links.get_mut(&request_id).unwrap();
		payer_link.transaction_id = Some(amikopay_primitives::hashing::transaction_id_of(&amikopay_primitives::types::Token::random()));
		payer_link.phase = PayerLinkPhase::AwaitingConfirmation;
	}

	let result = state_transition(&mut alice, StateChange::PaymentConfirmed(PaymentConfirmed { request_id, meeting_point_id: MeetingPointId(MP.to_string()) }), 0);
	assert!(matches!(result, Err(StateTransitionError::RouteUnavailable(_))));
}

#[test]
fn declining_a_receipt_cancels_the_payer_link_and_notifies_the_payee() {
	let mut alice = node_with_link("alice-carol", "alice->carol", "carol->alice", None);
	let request_id = RequestId("req-decline".to_string());
	state_transition(
		&mut alice,
		StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link: LocalId("alice->carol".to_string()), amount: 50 }),
		0,
	)
	.unwrap();
	{
		let payer_link = alice.payer_links.get_mut(&request_id).unwrap();
		payer_link.transaction_id = Some(amikopay_primitives::hashing::transaction_id_of(&amikopay_primitives::types::Token::random()));
		payer_link.phase = PayerLinkPhase::AwaitingConfirmation;
	}

	let events = state_transition(&mut alice, StateChange::PaymentDeclined(PaymentDeclined { request_id: request_id.clone() }), 0).unwrap();
	assert_eq!(alice.payer_links.get(&request_id).unwrap().phase, PayerLinkPhase::Cancelled);
	assert!(matches!(
		events.as_slice(),
		[Event::SendEnvelope(crate::types::event::SendEnvelope { envelope: amikopay_messages::Envelope { message: amikopay_messages::Message::PayeeCancel(_), .. } })]
	));
}

#[test]
fn receipt_with_mismatched_amount_is_a_protocol_violation() {
	use amikopay_messages::{
		Envelope,
		Message,
		Receipt,
	};

	let mut alice = node_with_link("alice-carol", "alice->carol", "carol->alice", None);
	let request_id = RequestId("req-3".to_string());
	state_transition(
		&mut alice,
		StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link: LocalId("alice->carol".to_string()), amount: 500 }),
		0,
	)
	.unwrap();

	let bogus_receipt = Envelope::new(
		LocalId("alice->carol".to_string()),
		Message::Receipt(Receipt {
			amount: 999,
			receipt: "coffee".to_string(),
			transaction_id: amikopay_primitives::hashing::transaction_id_of(&amikopay_primitives::types::Token::random()),
			meeting_points: vec![],
		}),
	);
	let result = state_transition(&mut alice, StateChange::MessageReceived(crate::types::state_change::MessageReceived { envelope: bogus_receipt }), 0);
	assert!(matches!(result, Err(StateTransitionError::ProtocolViolation(_))));
}
