//! `PayeeLink` transitions (§4.5): `request` → `Pay` → `Receipt` →
//! `Confirm` → routing → `Lock`/`Commit`/`SettleCommit`.
use amikopay_messages::{
	Envelope,
	MakeRoute,
	Message,
	Receipt,
	RouteDirection,
};
use amikopay_primitives::types::{
	LocalId,
	RequestId,
	Timestamp,
	Token,
	TransactionId,
};

use super::link::originate_or_continue;
use crate::{
	constants::DEFAULT_RECEIPT_LIFETIME,
	errors::StateTransitionError,
	types::{
		event::{
			PaymentSettled,
			SendEnvelope,
		},
		payee_link::{
			PayeeLinkPhase,
			PayeeLinkState,
		},
		state_change::PaymentRequested,
		Event,
		NodeState,
	},
};

pub fn request_payment(state: &mut NodeState, change: PaymentRequested) -> Result<Vec<Event>, StateTransitionError> {
	let token = Token::random();
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);
	let expires_at = change.requested_at + DEFAULT_RECEIPT_LIFETIME;

	let request_id = change.request_id.clone();
	let payee_link = PayeeLinkState::new(
		change.request_id,
		change.amount,
		change.receipt,
		token,
		transaction_id,
		change.candidate_meeting_points,
		change.requested_at,
		expires_at,
	);
	state.payee_links.insert(request_id.clone(), payee_link);
	state.payee_link_by_transaction.insert(transaction_id, request_id);
	Ok(vec![Event::PersistenceRequested(crate::types::event::PersistenceRequested)])
}

pub fn handle_pay(state: &mut NodeState, envelope: Envelope, _now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::Pay(msg) => msg,
		_ => unreachable!("dispatch_message only routes Pay here"),
	};
	let payee_link = state
		.payee_links
		.get_mut(&msg.request_id)
		.ok_or_else(|| StateTransitionError::UnknownPayeeLink(msg.request_id.0.clone()))?;
	if !matches!(payee_link.phase, PayeeLinkPhase::AwaitingPay) {
		return Err(StateTransitionError::ProtocolViolation(format!("Pay received for {} outside AwaitingPay", msg.request_id.0)))
	}
	payee_link.phase = PayeeLinkPhase::AwaitingConfirm;
	payee_link.initiator_link = Some(envelope.recipient.clone());

	Ok(vec![Event::SendEnvelope(SendEnvelope {
		envelope: Envelope::new(
			envelope.recipient,
			Message::Receipt(Receipt {
				amount: payee_link.amount,
				receipt: payee_link.receipt.clone(),
				transaction_id: payee_link.transaction_id,
				meeting_points: payee_link.candidate_meeting_points.clone(),
			}),
		),
	})])
}

pub fn handle_confirm(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::Confirm(msg) => msg,
		_ => unreachable!("dispatch_message only routes Confirm here"),
	};
	let request_id = payee_request_id_for_recipient(state, &envelope.recipient)?;
	let (amount, transaction_id) = {
		let payee_link = state
			.payee_links
			.get_mut(&request_id)
			.ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
		if !matches!(payee_link.phase, PayeeLinkPhase::AwaitingConfirm) {
			return Err(StateTransitionError::ProtocolViolation(format!("Confirm received for {} outside AwaitingConfirm", request_id.0)))
		}
		payee_link.chosen_meeting_point = Some(msg.meeting_point_id.clone());
		payee_link.phase = PayeeLinkPhase::Routing;
		(payee_link.amount, payee_link.transaction_id)
	};

	let make_route = MakeRoute {
		transaction_id,
		amount,
		direction: RouteDirection::Payee,
		meeting_point_id: msg.meeting_point_id,
		payer_id: None,
		payee_id: None,
		start_time: None,
		end_time: None,
	};
	originate_or_continue(state, transaction_id, &make_route, None, now)
}

/// Invoked by `machine::link::handle_have_payee_route` once `HavePayeeRoute`
/// has relayed all the way back to the hop that actually owns this
/// PayeeLink.
pub fn deliver_have_payee_route(state: &mut NodeState, transaction_id: TransactionId) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = state
		.payee_link_by_transaction
		.get(&transaction_id)
		.cloned()
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?;
	let payee_link = state.payee_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
	payee_link.phase = PayeeLinkPhase::RouteEstablished;
	Ok(vec![])
}

/// Invoked by `machine::link::lock_and_forward` when `Lock` reaches the
/// terminal hop owning this transaction.
pub fn deliver_lock(state: &mut NodeState, transaction_id: TransactionId, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = state
		.payee_link_by_transaction
		.get(&transaction_id)
		.cloned()
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?;
	let (token, amount) = {
		let payee_link = state.payee_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
		if !matches!(payee_link.phase, PayeeLinkPhase::RouteEstablished) {
			return Err(StateTransitionError::ProtocolViolation(format!("Lock received for {} outside RouteEstablished", request_id.0)))
		}
		payee_link.phase = PayeeLinkPhase::Committed;
		(payee_link.token.clone(), payee_link.amount)
	};
	let mut events = super::link::commit_and_forward(state, token.clone(), now)?;
	events.extend(super::link::settle_and_forward(state, token)?);
	events.push(Event::PaymentSettled(PaymentSettled { transaction_id, request_id, amount, settled_at: now }));
	Ok(events)
}

/// The payer declined a `Receipt` before confirming (§6, `PayeeCancel`).
pub fn handle_payee_cancel(state: &mut NodeState, envelope: Envelope) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = payee_request_id_for_recipient(state, &envelope.recipient)?;
	let payee_link = state.payee_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
	payee_link.phase = PayeeLinkPhase::Cancelled;
	Ok(vec![])
}

pub fn deliver_route_cancel(state: &mut NodeState, transaction_id: TransactionId) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = match state.payee_link_by_transaction.get(&transaction_id) {
		Some(id) => id.clone(),
		None => return Ok(vec![]),
	};
	if let Some(payee_link) = state.payee_links.get_mut(&request_id) {
		payee_link.phase = PayeeLinkPhase::Cancelled;
	}
	Ok(vec![])
}

fn payee_request_id_for_recipient(state: &NodeState, recipient: &LocalId) -> Result<RequestId, StateTransitionError> {
	state
		.payee_links
		.values()
		.find(|link| link.initiator_link.as_ref() == Some(recipient))
		.map(|link| link.request_id.clone())
		.ok_or_else(|| StateTransitionError::UnknownPayeeLink(recipient.0.clone()))
}
