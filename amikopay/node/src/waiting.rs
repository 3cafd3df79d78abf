//! Blocking waits for a PayerLink to reach `hasReceipt`/a terminal phase
//! (§4.7 "suspension points" (b)), implemented as a poll-sleep-retry loop
//! over the command mailbox rather than a condition variable, since the
//! node's state lives inside the single-writer loop rather than behind a
//! shared lock a waiter could block on directly.
use std::time::Duration;

use amikopay_primitives::types::{
	Amount,
	RequestId,
};
use amikopay_state_machine::types::PayerLinkPhase;
use tokio::time::sleep;

use crate::{
	command::NodeHandle,
	errors::NodeError,
};

/// Default delay between polls while a caller waits on a latch.
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_millis(50);

/// Result of a successfully received `Receipt` (§6 scenario 1: "A.pay(URL)
/// returns amount=123, receipt=\"receipt\"").
#[derive(Clone, Debug)]
pub struct PayResult {
	pub request_id: RequestId,
	pub amount: Amount,
	pub receipt: String,
}

/// Outcome of a payment that has reached a terminal PayerLink phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FinishedOutcome {
	Committed,
	Cancelled,
	TimedOut,
}

/// Polls until the named PayerLink leaves `AwaitingReceipt`, i.e. until
/// `Receipt` arrives or the request is cancelled/timed out first.
pub async fn wait_for_receipt(handle: &NodeHandle, request_id: &RequestId) -> Result<PayResult, NodeError> {
	loop {
		let snapshot = handle.peek_payer_link(request_id.clone()).await?;
		match snapshot.phase {
			PayerLinkPhase::AwaitingReceipt => sleep(DEFAULT_RETRY_TIMEOUT).await,
			PayerLinkPhase::Cancelled => return Err(NodeError::RouteUnavailable(request_id.clone())),
			PayerLinkPhase::TimedOut => return Err(NodeError::ReceiptTimedOut(request_id.clone())),
			_ => {
				return Ok(PayResult {
					request_id: request_id.clone(),
					amount: snapshot.amount,
					receipt: snapshot.receipt.unwrap_or_default(),
				})
			},
		}
	}
}

/// Polls until the named PayerLink reaches a terminal phase (§4.6
/// `committed`/`cancelled`/`timedOut`).
pub async fn wait_for_finished(handle: &NodeHandle, request_id: &RequestId) -> Result<FinishedOutcome, NodeError> {
	loop {
		let snapshot = handle.peek_payer_link(request_id.clone()).await?;
		match snapshot.phase {
			PayerLinkPhase::Committed => return Ok(FinishedOutcome::Committed),
			PayerLinkPhase::Cancelled => return Ok(FinishedOutcome::Cancelled),
			PayerLinkPhase::TimedOut => return Ok(FinishedOutcome::TimedOut),
			_ => sleep(DEFAULT_RETRY_TIMEOUT).await,
		}
	}
}
