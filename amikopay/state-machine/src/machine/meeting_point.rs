//! MeetingPoint matching (§4.4): a payer-side and a payee-side flood
//! converge here, indexed by `transactionID`, `amount` and time window.
use amikopay_messages::{
	Envelope,
	HavePayeeRoute,
	HavePayerRoute,
	MakeRoute,
	Message,
	RouteCancel,
	RouteDirection,
};
use amikopay_primitives::types::{
	LocalId,
	MeetingPointId,
	Timestamp,
	TransactionId,
};

use crate::{
	constants::MEETING_POINT_PENDING_TIMEOUT,
	errors::StateTransitionError,
	types::{
		event::{
			SendEnvelope,
			TimerCancelled,
			TimerScheduled,
		},
		meeting_point::PendingRoute,
		Event,
		NodeState,
		Transaction,
		TimerKey,
	},
};

/// Handles one side's `MakeRoute` arriving at a locally-hosted meeting
/// point. Matches it against the opposite side's pending map if present,
/// otherwise parks it.
pub fn handle_arrival(
	state: &mut NodeState,
	transaction_id: TransactionId,
	msg: &MakeRoute,
	arrived_from: Option<LocalId>,
	now: Timestamp,
) -> Result<Vec<Event>, StateTransitionError> {
	let from = arrived_from.ok_or_else(|| {
		StateTransitionError::ProtocolViolation("a MeetingPoint cannot be the true origin of a MakeRoute".into())
	})?;

	let candidate = PendingRoute { amount: msg.amount, start_time: msg.start_time, end_time: msg.end_time, from };

	let meeting_point = state
		.meeting_points
		.get_mut(&msg.meeting_point_id)
		.ok_or_else(|| StateTransitionError::UnknownMeetingPoint(msg.meeting_point_id.0.clone()))?;

	let (ours, theirs) = match msg.direction {
		RouteDirection::Payer => (&mut meeting_point.pending_payer, &mut meeting_point.pending_payee),
		RouteDirection::Payee => (&mut meeting_point.pending_payee, &mut meeting_point.pending_payer),
	};

	if ours.contains_key(&transaction_id) {
		return Ok(vec![])
	}

	let other = match theirs.get(&transaction_id) {
		Some(other) if other.amount == candidate.amount && windows_compatible(&candidate, other) => theirs.remove(&transaction_id).unwrap(),
		_ => {
			ours.insert(transaction_id, candidate);
			return Ok(vec![Event::TimerScheduled(TimerScheduled {
				key: TimerKey::MeetingPointPending { meeting_point_id: msg.meeting_point_id.clone(), transaction_id, direction: msg.direction },
				fire_at: now + MEETING_POINT_PENDING_TIMEOUT,
			})])
		}
	};

	let opposite_direction = match msg.direction {
		RouteDirection::Payer => RouteDirection::Payee,
		RouteDirection::Payee => RouteDirection::Payer,
	};

	let (payer_route, payee_route) = match msg.direction {
		RouteDirection::Payer => (candidate, other),
		RouteDirection::Payee => (other, candidate),
	};

	state.transactions.insert(
		transaction_id,
		Transaction {
			amount: msg.amount,
			start_time: msg.start_time,
			end_time: msg.end_time,
			meeting_point_id: msg.meeting_point_id.clone(),
			payer_id: Some(payer_route.from.clone()),
			payee_id: Some(payee_route.from.clone()),
			reservation: None,
		},
	);

	Ok(vec![
		// `theirs` was parked under a staleness timer when it first arrived;
		// it just matched, so that timer must not fire later.
		Event::TimerCancelled(TimerCancelled {
			key: TimerKey::MeetingPointPending { meeting_point_id: msg.meeting_point_id.clone(), transaction_id, direction: opposite_direction },
		}),
		Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(
				payer_route.from,
				Message::HavePayerRoute(HavePayerRoute { id: LocalId::payer(), transaction_id: Some(transaction_id) }),
			),
		}),
		Event::SendEnvelope(SendEnvelope {
			envelope: Envelope::new(
				payee_route.from,
				Message::HavePayeeRoute(HavePayeeRoute { id: LocalId::payer(), transaction_id: Some(transaction_id) }),
			),
		}),
	])
}

/// A MeetingPoint's staleness timer fired for one parked side of a flood:
/// discard it and cascade a cancellation back toward whoever sent it (§4.4
/// "Timeouts clear stale entries and cascade Cancel").
pub fn handle_pending_timeout(
	state: &mut NodeState,
	meeting_point_id: MeetingPointId,
	transaction_id: TransactionId,
	direction: RouteDirection,
) -> Result<Vec<Event>, StateTransitionError> {
	let meeting_point = match state.meeting_points.get_mut(&meeting_point_id) {
		Some(meeting_point) => meeting_point,
		None => return Ok(vec![]),
	};
	let pending = match direction {
		RouteDirection::Payer => &mut meeting_point.pending_payer,
		RouteDirection::Payee => &mut meeting_point.pending_payee,
	};
	let entry = match pending.remove(&transaction_id) {
		Some(entry) => entry,
		// Already matched (and its timer cancelled) or already swept by an
		// earlier stale fire: nothing left to do.
		None => return Ok(vec![]),
	};
	Ok(vec![Event::SendEnvelope(SendEnvelope { envelope: Envelope::new(entry.from, Message::RouteCancel(RouteCancel { transaction_id })) })])
}

fn windows_compatible(a: &PendingRoute, b: &PendingRoute) -> bool {
	match (a.start_time, a.end_time, b.start_time, b.end_time) {
		(Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => a_start.max(b_start) <= a_end.min(b_end),
		_ => true,
	}
}
