//! `PayerLink` transitions (§4.6): `pay` → `Pay` → `Receipt` →
//! `confirmPayment` → routing → `Lock`/`Commit`.
use amikopay_messages::{
	Confirm,
	Envelope,
	MakeRoute,
	Message,
	Pay,
	PayeeCancel,
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
	constants::PAYER_INITIAL_TIMEOUT,
	errors::StateTransitionError,
	types::{
		event::{
			SendEnvelope,
			TimerCancelled,
			TimerScheduled,
		},
		payer_link::{
			PayerLinkPhase,
			PayerLinkState,
		},
		state_change::{
			PaymentConfirmed,
			PaymentDeclined,
			PaymentInitiated,
		},
		Event,
		NodeState,
		TimerKey,
	},
};

pub fn initiate_payment(state: &mut NodeState, change: PaymentInitiated, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	if !state.links.contains_key(&change.remote_link) {
		return Err(StateTransitionError::UnknownLink(change.remote_link))
	}
	let payer_link = PayerLinkState::new(change.request_id.clone(), change.remote_link.clone(), change.amount);
	state.payer_links.insert(change.request_id.clone(), payer_link);
	Ok(vec![
		Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(change.remote_link, Message::Pay(Pay { request_id: change.request_id.clone() })),
		}),
		Event::TimerScheduled(TimerScheduled { key: TimerKey::PayerInitial(change.request_id), fire_at: now + PAYER_INITIAL_TIMEOUT }),
	])
}

/// The `initial` deadline fired before `Receipt` arrived (§4.6
/// `Timeout(initial)`, §8 Scenario 3).
pub fn handle_initial_timeout(state: &mut NodeState, request_id: RequestId) -> Result<Vec<Event>, StateTransitionError> {
	let payer_link = match state.payer_links.get_mut(&request_id) {
		Some(payer_link) => payer_link,
		None => return Ok(vec![]),
	};
	if !matches!(payer_link.phase, PayerLinkPhase::AwaitingReceipt) {
		// Receipt already arrived (or the link was already cancelled) before
		// this stale timer fired.
		return Ok(vec![])
	}
	payer_link.phase = PayerLinkPhase::TimedOut;
	Ok(vec![Event::PersistenceRequested(crate::types::event::PersistenceRequested)])
}

pub fn handle_receipt(state: &mut NodeState, envelope: Envelope, _now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::Receipt(msg) => msg,
		_ => unreachable!("dispatch_message only routes Receipt here"),
	};
	let request_id = payer_request_id_for_link(state, &envelope.recipient)?;
	let payer_link = state.payer_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownTransaction(msg.transaction_id))?;
	if !matches!(payer_link.phase, PayerLinkPhase::AwaitingReceipt) {
		return Err(StateTransitionError::ProtocolViolation(format!("Receipt received for {} outside AwaitingReceipt", request_id.0)))
	}
	// `pay()` does not require the caller to already know the amount (§6,
	// `pay(URL, linkname?)`): an `amount` of 0 means "not yet known", and
	// the first Receipt sets it. A nonzero amount was pinned by the caller
	// in advance and must match exactly.
	if payer_link.amount != 0 && msg.amount != payer_link.amount {
		return Err(StateTransitionError::ProtocolViolation(format!(
			"Receipt amount {} does not match requested {}",
			msg.amount, payer_link.amount
		)))
	}
	payer_link.amount = msg.amount;
	payer_link.receipt = Some(msg.receipt);
	payer_link.transaction_id = Some(msg.transaction_id);
	payer_link.phase = PayerLinkPhase::AwaitingConfirmation;
	let _ = msg.meeting_points;
	Ok(vec![
		Event::PersistenceRequested(crate::types::event::PersistenceRequested),
		Event::TimerCancelled(TimerCancelled { key: TimerKey::PayerInitial(request_id) }),
	])
}

pub fn confirm_payment(state: &mut NodeState, change: PaymentConfirmed, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let (remote_link, amount, transaction_id) = {
		let payer_link = state
			.payer_links
			.get_mut(&change.request_id)
			.ok_or_else(|| StateTransitionError::UnknownPayeeLink(change.request_id.0.clone()))?;
		if !matches!(payer_link.phase, PayerLinkPhase::AwaitingConfirmation) {
			return Err(StateTransitionError::ProtocolViolation(format!(
				"confirmPayment called for {} outside AwaitingConfirmation",
				change.request_id.0
			)))
		}
		let transaction_id = payer_link.transaction_id.ok_or(StateTransitionError::ProtocolViolation(
			"PayerLink has no transactionID to confirm".into(),
		))?;
		payer_link.meeting_point_id = Some(change.meeting_point_id.clone());
		payer_link.phase = PayerLinkPhase::Routing;
		(payer_link.remote_link.clone(), payer_link.amount, transaction_id)
	};

	let mut events = vec![Event::SendEnvelope(SendEnvelope {
		envelope: Envelope::new(remote_link, Message::Confirm(Confirm { meeting_point_id: change.meeting_point_id.clone() })),
	})];

	state.payer_link_by_transaction.insert(transaction_id, change.request_id);
	let make_route = MakeRoute {
		transaction_id,
		amount,
		direction: RouteDirection::Payer,
		meeting_point_id: change.meeting_point_id,
		payer_id: None,
		payee_id: None,
		start_time: None,
		end_time: None,
	};
	events.extend(originate_or_continue(state, transaction_id, &make_route, None, now)?);
	Ok(events)
}

/// `confirmPayment(Payer, false)` (§4.6): decline a received `Receipt`.
pub fn decline_payment(state: &mut NodeState, change: PaymentDeclined) -> Result<Vec<Event>, StateTransitionError> {
	let remote_link = {
		let payer_link = state
			.payer_links
			.get_mut(&change.request_id)
			.ok_or_else(|| StateTransitionError::UnknownPayeeLink(change.request_id.0.clone()))?;
		if !matches!(payer_link.phase, PayerLinkPhase::AwaitingConfirmation) {
			return Err(StateTransitionError::ProtocolViolation(format!(
				"confirmPayment(false) called for {} outside AwaitingConfirmation",
				change.request_id.0
			)))
		}
		payer_link.phase = PayerLinkPhase::Cancelled;
		payer_link.remote_link.clone()
	};
	Ok(vec![Event::SendEnvelope(SendEnvelope { envelope: Envelope::new(remote_link, Message::PayeeCancel(PayeeCancel)) })])
}

/// Invoked by `machine::link::handle_have_payer_route` once `HavePayerRoute`
/// has relayed all the way back to the hop that actually owns this
/// PayerLink.
pub fn deliver_have_payer_route(state: &mut NodeState, transaction_id: TransactionId, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = state
		.payer_link_by_transaction
		.get(&transaction_id)
		.cloned()
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?;
	{
		let payer_link = state.payer_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
		if !matches!(payer_link.phase, PayerLinkPhase::Routing) {
			return Err(StateTransitionError::ProtocolViolation(format!("HavePayerRoute received for {} outside Routing", request_id.0)))
		}
		payer_link.phase = PayerLinkPhase::Locked;
	}
	super::link::lock_and_forward(state, transaction_id, now)
}

/// Invoked by `machine::link::commit_and_forward` when `Commit` reaches the
/// terminal hop owning this transaction.
pub fn deliver_commit(state: &mut NodeState, token: Token, _now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);
	let request_id = state
		.payer_link_by_transaction
		.get(&transaction_id)
		.cloned()
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?;
	let payer_link = state.payer_links.get_mut(&request_id).ok_or_else(|| StateTransitionError::UnknownPayeeLink(request_id.0.clone()))?;
	if !matches!(payer_link.phase, PayerLinkPhase::Locked) {
		return Err(StateTransitionError::ProtocolViolation(format!("Commit received for {} outside Locked", request_id.0)))
	}
	payer_link.token = Some(token);
	payer_link.phase = PayerLinkPhase::Committed;
	Ok(vec![])
}

pub fn deliver_route_cancel(state: &mut NodeState, transaction_id: TransactionId) -> Result<Vec<Event>, StateTransitionError> {
	let request_id = match state.payer_link_by_transaction.get(&transaction_id) {
		Some(id) => id.clone(),
		None => return Ok(vec![]),
	};
	if let Some(payer_link) = state.payer_links.get_mut(&request_id) {
		payer_link.phase = PayerLinkPhase::Cancelled;
	}
	Ok(vec![])
}

fn payer_request_id_for_link(state: &NodeState, recipient: &LocalId) -> Result<RequestId, StateTransitionError> {
	state
		.payer_links
		.values()
		.find(|link| &link.remote_link == recipient)
		.map(|link| link.request_id.clone())
		.ok_or_else(|| StateTransitionError::UnknownLink(recipient.clone()))
}
