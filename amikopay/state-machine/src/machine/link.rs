//! Link lifecycle (`makeLink`, `deposit`) and the routed-payment messages
//! that travel hop by hop across Links: `MakeRoute`, `Lock`, `Commit`,
//! `SettleCommit`, `RouteCancel` (§4.2, §4.3).
use amikopay_messages::{
	Commit as CommitMsg,
	Envelope,
	HavePayeeRoute as HavePayeeRouteMsg,
	HavePayerRoute as HavePayerRouteMsg,
	Lock as LockMsg,
	MakeRoute,
	Message,
	RouteCancel as RouteCancelMsg,
	RouteDirection,
	SettleCommit as SettleCommitMsg,
};
use amikopay_primitives::types::{
	LocalId,
	Timestamp,
	TransactionId,
};

use super::{
	meeting_point,
	payee_link,
	payer_link,
	routing::reserve_first_fit,
};
use crate::{
	errors::StateTransitionError,
	types::{
		event::{
			SendEnvelope,
			TimerCancelled,
		},
		state_change::{
			ChannelOpened,
			LinkCreated,
		},
		ChannelState,
		Event,
		LinkState,
		NodeState,
		Reservation,
		ReserveSide,
		TimerKey,
		Transaction,
	},
};

pub fn create_link(state: &mut NodeState, change: LinkCreated) -> Result<Vec<Event>, StateTransitionError> {
	let link = LinkState::new(change.name, change.local_id.clone(), change.remote_id, change.remote_url);
	state.links.insert(change.local_id, link);
	Ok(vec![Event::PersistenceRequested(crate::types::event::PersistenceRequested)])
}

pub fn open_channel(state: &mut NodeState, change: ChannelOpened) -> Result<Vec<Event>, StateTransitionError> {
	let link = state
		.links
		.get_mut(&change.link)
		.ok_or_else(|| StateTransitionError::UnknownLink(change.link.clone()))?;
	link.channels.push(ChannelState::new(change.variant, change.amount_local, change.amount_remote));
	Ok(vec![Event::PersistenceRequested(crate::types::event::PersistenceRequested)])
}

/// Kicks off a new flood: called both by `PayerLink`/`PayeeLink` when they
/// originate a payment (`arrived_from = None`) and by `handle_make_route`
/// when an inbound `MakeRoute` must continue onward.
pub fn originate_or_continue(
	state: &mut NodeState,
	transaction_id: TransactionId,
	msg: &MakeRoute,
	arrived_from: Option<LocalId>,
	now: Timestamp,
) -> Result<Vec<Event>, StateTransitionError> {
	if state.meeting_points.contains_key(&msg.meeting_point_id) {
		return meeting_point::handle_arrival(state, transaction_id, msg, arrived_from, now)
	}

	let side = match msg.direction {
		RouteDirection::Payer => ReserveSide::Outgoing,
		RouteDirection::Payee => ReserveSide::Incoming,
	};
	let reservation = reserve_first_fit(state, arrived_from.as_ref(), transaction_id, msg.amount, side);

	let (forward_link, channel_index) = match reservation {
		Some(hit) => hit,
		None => return cancel_towards_origin(state, transaction_id, arrived_from),
	};

	if let Some(from) = &arrived_from {
		if let Some(link) = state.links.get_mut(from) {
			link.open_transactions.insert(transaction_id);
		}
	}

	let (payer_id, payee_id) = match msg.direction {
		RouteDirection::Payer => (arrived_from.clone(), Some(forward_link.clone())),
		RouteDirection::Payee => (Some(forward_link.clone()), arrived_from.clone()),
	};

	state.transactions.insert(
		transaction_id,
		Transaction {
			amount: msg.amount,
			start_time: msg.start_time,
			end_time: msg.end_time,
			meeting_point_id: msg.meeting_point_id.clone(),
			payer_id,
			payee_id,
			reservation: Some(Reservation { link: forward_link.clone(), channel_index, side }),
		},
	);

	let mut forwarded = msg.clone();
	forwarded.payer_id = arrived_from.clone();
	Ok(vec![Event::SendEnvelope(SendEnvelope {
		envelope: Envelope::new(forward_link, Message::MakeRoute(forwarded)),
	})])
}

fn cancel_towards_origin(
	state: &mut NodeState,
	transaction_id: TransactionId,
	arrived_from: Option<LocalId>,
) -> Result<Vec<Event>, StateTransitionError> {
	match arrived_from {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::RouteCancel(RouteCancelMsg { transaction_id })),
		})]),
		None => Err(StateTransitionError::RouteUnavailable(transaction_id)),
	}
}

pub fn handle_make_route(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::MakeRoute(msg) => msg,
		_ => unreachable!("dispatch_message only routes MakeRoute here"),
	};
	if state.transactions.contains_key(&msg.transaction_id)
		|| state.links.get(&envelope.recipient).map(|l| l.open_transactions.contains(&msg.transaction_id)).unwrap_or(false)
	{
		// Already seen this transaction on this hop: a race in the flood. Drop
		// it silently; the first arrival already reserved capacity.
		return Ok(vec![])
	}
	originate_or_continue(state, msg.transaction_id, &msg, Some(envelope.recipient), now)
}

/// Relays `HavePayerRoute` hop by hop along `payer_id` until it reaches the
/// hop that actually originated the payer-side flood (§4.4, §4.6). A
/// MeetingPoint only ever addresses its immediate neighbour on the payer
/// side; every intermediate hop in between must forward it onward itself.
pub fn handle_have_payer_route(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::HavePayerRoute(msg) => msg,
		_ => unreachable!("dispatch_message only routes HavePayerRoute here"),
	};
	let transaction_id = msg.transaction_id.ok_or_else(|| {
		StateTransitionError::ProtocolViolation("HavePayerRoute without a transaction id".into())
	})?;
	match payer_side(state, transaction_id)? {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::HavePayerRoute(HavePayerRouteMsg { id: msg.id, transaction_id: Some(transaction_id) })),
		})]),
		None => payer_link::deliver_have_payer_route(state, transaction_id, now),
	}
}

/// Relays `HavePayeeRoute` hop by hop along `payee_id` until it reaches the
/// hop that actually originated the payee-side flood (§4.4, §4.5). Mirrors
/// [`handle_have_payer_route`] in the opposite direction.
pub fn handle_have_payee_route(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::HavePayeeRoute(msg) => msg,
		_ => unreachable!("dispatch_message only routes HavePayeeRoute here"),
	};
	let transaction_id = msg.transaction_id.ok_or_else(|| {
		StateTransitionError::ProtocolViolation("HavePayeeRoute without a transaction id".into())
	})?;
	match payee_side(state, transaction_id)? {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::HavePayeeRoute(HavePayeeRouteMsg { id: msg.id, transaction_id: Some(transaction_id) })),
		})]),
		None => payee_link::deliver_have_payee_route(state, transaction_id),
	}
}

/// Looks up which side (`payer_id` or `payee_id`) of `transaction_id` a
/// payer-directed message should continue toward.
fn payer_side(state: &NodeState, transaction_id: TransactionId) -> Result<Option<LocalId>, StateTransitionError> {
	Ok(state
		.transactions
		.get(&transaction_id)
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?
		.payer_id
		.clone())
}

fn payee_side(state: &NodeState, transaction_id: TransactionId) -> Result<Option<LocalId>, StateTransitionError> {
	Ok(state
		.transactions
		.get(&transaction_id)
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?
		.payee_id
		.clone())
}

pub fn handle_lock(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::Lock(msg) => msg,
		_ => unreachable!("dispatch_message only routes Lock here"),
	};
	lock_and_forward(state, msg.transaction_id, now)
}

/// Locks this hop's own reservation (if any) and forwards `Lock` on toward
/// the payee, or delivers it to the local `PayeeLink` at the terminal hop.
pub fn lock_and_forward(state: &mut NodeState, transaction_id: TransactionId, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	if let Some(Reservation { link, channel_index, side }) =
		state.transactions.get(&transaction_id).ok_or(StateTransitionError::UnknownTransaction(transaction_id))?.reservation.clone()
	{
		let channel = super::routing::channel_mut(state, &link, channel_index)?;
		let result = match side {
			ReserveSide::Outgoing => channel.lock_outgoing(transaction_id),
			ReserveSide::Incoming => channel.lock_incoming(transaction_id),
		};
		result.map_err(|source| StateTransitionError::Channel { link, channel_index, source })?;
	}

	match payee_side(state, transaction_id)? {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::Lock(LockMsg { transaction_id })),
		})]),
		None => payee_link::deliver_lock(state, transaction_id, now),
	}
}

pub fn handle_commit(state: &mut NodeState, envelope: Envelope, now: Timestamp) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::Commit(msg) => msg,
		_ => unreachable!("dispatch_message only routes Commit here"),
	};
	commit_and_forward(state, msg.token, now)
}

/// Commits this hop's own lock (if any), moving balances, and forwards
/// `Commit` on toward the payer, or delivers it to the local `PayerLink`.
pub fn commit_and_forward(
	state: &mut NodeState,
	token: amikopay_primitives::types::Token,
	now: Timestamp,
) -> Result<Vec<Event>, StateTransitionError> {
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);
	if let Some(Reservation { link, channel_index, side }) =
		state.transactions.get(&transaction_id).ok_or(StateTransitionError::UnknownTransaction(transaction_id))?.reservation.clone()
	{
		let channel = super::routing::channel_mut(state, &link, channel_index)?;
		let result = match side {
			ReserveSide::Outgoing => channel.commit_outgoing(transaction_id),
			ReserveSide::Incoming => channel.commit_incoming(transaction_id),
		};
		result.map_err(|source| StateTransitionError::Channel { link, channel_index, source })?;
	}

	let mut events = match payer_side(state, transaction_id)? {
		Some(link) => vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::Commit(CommitMsg { token: token.clone() })),
		})],
		None => payer_link::deliver_commit(state, token.clone(), now)?,
	};
	events.push(Event::TimerCancelled(TimerCancelled { key: TimerKey::Route(transaction_id) }));
	Ok(events)
}

pub fn handle_settle_commit(state: &mut NodeState, envelope: Envelope) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::SettleCommit(msg) => msg,
		_ => unreachable!("dispatch_message only routes SettleCommit here"),
	};
	settle_and_forward(state, msg.token)
}

/// Final housekeeping pass that follows `Commit` along the same path: no
/// further balance changes, just releasing per-hop bookkeeping.
pub fn settle_and_forward(state: &mut NodeState, token: amikopay_primitives::types::Token) -> Result<Vec<Event>, StateTransitionError> {
	let transaction_id = amikopay_primitives::hashing::transaction_id_of(&token);
	let transaction = state
		.transactions
		.remove(&transaction_id)
		.ok_or(StateTransitionError::UnknownTransaction(transaction_id))?;

	if let Some(link_id) = &transaction.payer_id {
		if let Some(link) = state.links.get_mut(link_id) {
			link.open_transactions.remove(&transaction_id);
		}
	}
	if let Some(link_id) = &transaction.payee_id {
		if let Some(link) = state.links.get_mut(link_id) {
			link.open_transactions.remove(&transaction_id);
		}
	}

	match transaction.payer_id {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::SettleCommit(SettleCommitMsg { token })),
		})]),
		None => Ok(vec![]),
	}
}

pub fn handle_route_cancel(state: &mut NodeState, envelope: Envelope) -> Result<Vec<Event>, StateTransitionError> {
	let msg = match envelope.message {
		Message::RouteCancel(msg) => msg,
		_ => unreachable!("dispatch_message only routes RouteCancel here"),
	};
	cancel_and_unwind(state, msg.transaction_id, Some(envelope.recipient))
}

/// Rolls back this hop's reservation (if any) and propagates the
/// cancellation back toward whichever side delivered this flood to this
/// hop, terminating at the originating `PayerLink`/`PayeeLink`.
pub fn cancel_and_unwind(
	state: &mut NodeState,
	transaction_id: TransactionId,
	arrived_from: Option<LocalId>,
) -> Result<Vec<Event>, StateTransitionError> {
	let transaction = match state.transactions.remove(&transaction_id) {
		Some(t) => t,
		None => return Ok(vec![]),
	};

	if let Some(Reservation { link, channel_index, .. }) = &transaction.reservation {
		if let Ok(channel) = super::routing::channel_mut(state, link, *channel_index) {
			let _ = channel.rollback(transaction_id);
		}
	}

	// Relay toward whichever side did not deliver this cancellation to us.
	let relay_target = match arrived_from {
		Some(from) if transaction.payer_id.as_ref() == Some(&from) => transaction.payee_id.clone(),
		Some(_) => transaction.payer_id.clone(),
		None => None,
	};

	if let Some(link_id) = &transaction.payer_id {
		if let Some(link) = state.links.get_mut(link_id) {
			link.open_transactions.remove(&transaction_id);
		}
	}
	if let Some(link_id) = &transaction.payee_id {
		if let Some(link) = state.links.get_mut(link_id) {
			link.open_transactions.remove(&transaction_id);
		}
	}

	match relay_target {
		Some(link) => Ok(vec![Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(link, Message::RouteCancel(RouteCancelMsg { transaction_id })),
		})]),
		None => {
			let mut events = payee_link::deliver_route_cancel(state, transaction_id)?;
			events.extend(payer_link::deliver_route_cancel(state, transaction_id)?);
			Ok(events)
		}
	}
}
