//! Top-level dispatch: routes a `StateChange` to the transition function
//! that owns it (§4.7). Mirrors the source's own `chain.rs` dispatcher.
use amikopay_messages::{
	Envelope,
	Message,
};
use amikopay_primitives::types::Timestamp;

use super::{
	link,
	meeting_point,
	payee_link,
	payer_link,
};
use crate::{
	errors::StateTransitionError,
	types::{
		Event,
		NodeState,
		StateChange,
		TimerKey,
	},
};

pub fn state_transition(state: &mut NodeState, change: StateChange, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	match change {
		StateChange::LinkCreated(c) => link::create_link(state, c),
		StateChange::ChannelOpened(c) => link::open_channel(state, c),
		StateChange::PaymentRequested(c) => payee_link::request_payment(state, c),
		StateChange::PaymentInitiated(c) => payer_link::initiate_payment(state, c, now),
		StateChange::PaymentConfirmed(c) => payer_link::confirm_payment(state, c, now),
		StateChange::PaymentDeclined(c) => payer_link::decline_payment(state, c),
		StateChange::TimerFired(c) => handle_timer(state, c.key),
		StateChange::MessageReceived(c) => dispatch_message(state, c.envelope, now),
	}
}

fn dispatch_message(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	match &envelope.message {
		Message::Pay(_) => payee_link::handle_pay(state, envelope, now),
		Message::Receipt(_) => payer_link::handle_receipt(state, envelope, now),
		Message::Confirm(_) => payee_link::handle_confirm(state, envelope, now),
		Message::PayeeCancel(_) => payee_link::handle_payee_cancel(state, envelope),
		Message::MakeRoute(_) => link::handle_make_route(state, envelope, now),
		Message::HavePayerRoute(_) => link::handle_have_payer_route(state, envelope, now),
		Message::HavePayeeRoute(_) => link::handle_have_payee_route(state, envelope, now),
		Message::Lock(_) => link::handle_lock(state, envelope, now),
		Message::Commit(_) => link::handle_commit(state, envelope, now),
		Message::SettleCommit(_) => link::handle_settle_commit(state, envelope),
		Message::RouteCancel(_) => link::handle_route_cancel(state, envelope),
	}
}

/// A scheduled timer fired: dispatches on which entity it belongs to,
/// since a bare transaction id cannot distinguish a PayerLink's `initial`
/// deadline (no transaction exists yet) from a MeetingPoint's staleness
/// timeout on one side of a flood (§4.7, §9 "timer min-heap").
fn handle_timer(state: &mut NodeState, key: TimerKey) -> Result<Vec<Event>, StateTransitionError> {
	match key {
		TimerKey::PayerInitial(request_id) => payer_link::handle_initial_timeout(state, request_id),
		TimerKey::MeetingPointPending { meeting_point_id, transaction_id, direction } => {
			meeting_point::handle_pending_timeout(state, meeting_point_id, transaction_id, direction)
		},
		TimerKey::Route(transaction_id) => link::cancel_and_unwind(state, transaction_id, None),
	}
}
