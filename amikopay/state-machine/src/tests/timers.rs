//! A timer firing mid-flood must unwind this node's own reservation and
//! cancel whichever Payer/PayeeLink owns the transaction (§4.7, §9).
use amikopay_messages::RouteDirection;
use amikopay_primitives::types::{
	LocalId,
	MeetingPointId,
	RequestId,
	Token,
};

use crate::{
	machine::state_transition,
	tests::factories::node_with_link,
	types::{
		state_change::TimerFired,
		MeetingPointState,
		PayerLinkPhase,
		PayerLinkState,
		PendingRoute,
		Reservation,
		ReserveSide,
		StateChange,
		TimerKey,
		Transaction,
	},
};

#[test]
fn timer_fired_cancels_an_in_flight_payment_and_releases_its_reservation() {
	let mut alice = node_with_link("alice-router", "alice->router", "router->alice", Some((1000, 1000)));
	let token = Token::random();
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);
	let request_id = RequestId("req-timeout".to_string());

	{
		let link = alice.links.get_mut(&LocalId("alice->router".to_string())).unwrap();
		link.channels[0].reserve_outgoing(transaction_id, 200).unwrap();
		link.open_transactions.insert(transaction_id);
	}

	let mut payer_link = PayerLinkState::new(request_id.clone(), LocalId("alice->carol".to_string()), 200);
	payer_link.transaction_id = Some(transaction_id);
	payer_link.phase = PayerLinkPhase::Routing;
	alice.payer_links.insert(request_id.clone(), payer_link);
	alice.payer_link_by_transaction.insert(transaction_id, request_id.clone());
	alice.transactions.insert(
		transaction_id,
		Transaction {
			amount: 200,
			start_time: None,
			end_time: None,
			meeting_point_id: MeetingPointId("mp1".to_string()),
			payer_id: None,
			payee_id: Some(LocalId("alice->router".to_string())),
			reservation: Some(Reservation { link: LocalId("alice->router".to_string()), channel_index: 0, side: ReserveSide::Outgoing }),
		},
	);

	state_transition(&mut alice, StateChange::TimerFired(TimerFired { key: TimerKey::Route(transaction_id), now: 100 }), 100).expect("timeout handling never fails");

	assert!(!alice.transactions.contains_key(&transaction_id));
	assert_eq!(alice.payer_links.get(&request_id).unwrap().phase, PayerLinkPhase::Cancelled);
	let channel = &alice.links.get(&LocalId("alice->router".to_string())).unwrap().channels[0];
	assert_eq!(channel.outgoing_capacity_used(), 0);
}

#[test]
fn payer_initial_timeout_times_out_a_payer_link_still_awaiting_receipt() {
	let mut alice = node_with_link("alice-carol", "alice->carol", "carol->alice", None);
	let request_id = RequestId("req-initial-timeout".to_string());
	let payer_link = PayerLinkState::new(request_id.clone(), LocalId("alice->carol".to_string()), 500);
	alice.payer_links.insert(request_id.clone(), payer_link);

	state_transition(&mut alice, StateChange::TimerFired(TimerFired { key: TimerKey::PayerInitial(request_id.clone()), now: 30 }), 30)
		.expect("timeout handling never fails");

	assert_eq!(alice.payer_links.get(&request_id).unwrap().phase, PayerLinkPhase::TimedOut);
}

#[test]
fn payer_initial_timeout_is_a_no_op_once_receipt_already_arrived() {
	let mut alice = node_with_link("alice-carol", "alice->carol", "carol->alice", None);
	let request_id = RequestId("req-already-confirmed".to_string());
	let mut payer_link = PayerLinkState::new(request_id.clone(), LocalId("alice->carol".to_string()), 500);
	payer_link.phase = PayerLinkPhase::AwaitingConfirmation;
	alice.payer_links.insert(request_id.clone(), payer_link);

	state_transition(&mut alice, StateChange::TimerFired(TimerFired { key: TimerKey::PayerInitial(request_id.clone()), now: 30 }), 30)
		.expect("a stale initial timeout never fails");

	// Receipt already landed: the timer firing late must not clobber progress.
	assert_eq!(alice.payer_links.get(&request_id).unwrap().phase, PayerLinkPhase::AwaitingConfirmation);
}

#[test]
fn meeting_point_pending_timeout_cancels_a_stale_parked_side_back_toward_its_sender() {
	let mut router = node_with_link("router-bob", "router->bob", "bob->router", Some((1000, 1000)));
	let meeting_point_id = MeetingPointId("mp1".to_string());
	router.meeting_points.insert(meeting_point_id.clone(), MeetingPointState::new(meeting_point_id.clone()));
	let token = Token::random();
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);

	router
		.meeting_points
		.get_mut(&meeting_point_id)
		.unwrap()
		.pending_payer
		.insert(transaction_id, PendingRoute { amount: 200, start_time: None, end_time: None, from: LocalId("router->bob".to_string()) });

	let events = state_transition(
		&mut router,
		StateChange::TimerFired(TimerFired { key: TimerKey::MeetingPointPending { meeting_point_id: meeting_point_id.clone(), transaction_id, direction: RouteDirection::Payer }, now: 60 }),
		60,
	)
	.expect("a stale-entry sweep never fails");

	assert!(!router.meeting_points.get(&meeting_point_id).unwrap().pending_payer.contains_key(&transaction_id));
	assert!(matches!(
		events.as_slice(),
		[crate::types::Event::SendEnvelope(crate::types::event::SendEnvelope {
			envelope: amikopay_messages::Envelope { message: amikopay_messages::Message::RouteCancel(_), .. }
		})]
	));
}

#[test]
fn meeting_point_pending_timeout_is_a_no_op_once_the_side_already_matched() {
	let mut router = node_with_link("router-bob", "router->bob", "bob->router", Some((1000, 1000)));
	let meeting_point_id = MeetingPointId("mp1".to_string());
	router.meeting_points.insert(meeting_point_id.clone(), MeetingPointState::new(meeting_point_id.clone()));
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&Token::random());

	let events = state_transition(
		&mut router,
		StateChange::TimerFired(TimerFired { key: TimerKey::MeetingPointPending { meeting_point_id, transaction_id, direction: RouteDirection::Payer }, now: 60 }),
		60,
	)
	.expect("a timer for an already-matched or already-swept entry never fails");

	assert!(events.is_empty());
}
