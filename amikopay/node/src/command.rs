//! The public API surface (§6) and the command mailbox it marshals onto the
//! node loop. Each command carries its own richly-typed result rather than
//! a single shared return envelope (§9, SUPPLEMENTED FEATURES).
use amikopay_messages::PaymentUrl;
use amikopay_primitives::types::{
	Amount,
	ChannelIndex,
	LinkName,
	LocalId,
	MeetingPointId,
	RequestId,
};
use amikopay_state_machine::types::{
	ChannelVariant,
	PayeeLinkPhase,
	PayerLinkPhase,
};
use tokio::sync::{
	mpsc::UnboundedSender,
	oneshot,
};

use crate::errors::NodeError;

/// One entry of `list()`'s payer-side half.
#[derive(Clone, Debug)]
pub struct PayerSummary {
	pub request_id: RequestId,
	pub amount: Amount,
	pub phase: PayerLinkPhase,
}

/// One entry of `list()`'s payee-side half.
#[derive(Clone, Debug)]
pub struct PayeeSummary {
	pub request_id: RequestId,
	pub amount: Amount,
	pub phase: PayeeLinkPhase,
}

#[derive(Clone, Debug, Default)]
pub struct NodeListing {
	pub payers: Vec<PayerSummary>,
	pub payees: Vec<PayeeSummary>,
}

/// A point-in-time read of one PayerLink, used by [`crate::waiting`] to poll
/// for `hasReceipt`/terminal phases without reaching into loop-owned state.
#[derive(Clone, Debug)]
pub struct PayerLinkSnapshot {
	pub phase: PayerLinkPhase,
	pub amount: Amount,
	pub receipt: Option<String>,
}

/// `confirmPayment(Payer, bool)`'s decision (§6).
#[derive(Clone, Copy, Debug)]
pub enum ConfirmDecision {
	Accept { meeting_point_id: MeetingPointId },
	Decline,
}

pub(crate) enum Command {
	Request { amount: Amount, receipt: String, candidate_meeting_points: Vec<MeetingPointId>, reply: oneshot::Sender<Result<PaymentUrl, NodeError>> },
	Pay { url: PaymentUrl, link_name: Option<LinkName>, reply: oneshot::Sender<Result<RequestId, NodeError>> },
	ConfirmPayment { request_id: RequestId, decision: ConfirmDecision, reply: oneshot::Sender<Result<(), NodeError>> },
	List { reply: oneshot::Sender<Result<NodeListing, NodeError>> },
	GetBalance { reply: oneshot::Sender<Result<Amount, NodeError>> },
	MakeLink { name: LinkName, local_id: LocalId, remote_id: LocalId, remote_url: Option<String>, reply: oneshot::Sender<Result<(), NodeError>> },
	Deposit { link: LocalId, variant: ChannelVariant, amount: Amount, reply: oneshot::Sender<Result<ChannelIndex, NodeError>> },
	Withdraw { link: LocalId, channel_index: ChannelIndex, reply: oneshot::Sender<Result<(), NodeError>> },
	PeekPayerLink { request_id: RequestId, reply: oneshot::Sender<Result<PayerLinkSnapshot, NodeError>> },
	Stop { reply: oneshot::Sender<()> },
}

/// A cheaply-cloneable handle callers use from any thread to marshal a
/// command onto the node loop and await its reply — the loop processes at
/// most one command per iteration (§4.7).
#[derive(Clone)]
pub struct NodeHandle {
	pub(crate) mailbox: UnboundedSender<Command>,
}

impl NodeHandle {
	async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T, NodeError>>) -> Command) -> Result<T, NodeError> {
		let (reply_tx, reply_rx) = oneshot::channel();
		self.mailbox.send(build(reply_tx)).map_err(|_| NodeError::Stopped)?;
		reply_rx.await.map_err(|_| NodeError::Stopped)?
	}

	pub async fn request(&self, amount: Amount, receipt: String, candidate_meeting_points: Vec<MeetingPointId>) -> Result<PaymentUrl, NodeError> {
		self.call(|reply| Command::Request { amount, receipt, candidate_meeting_points, reply }).await
	}

	pub async fn pay(&self, url: PaymentUrl, link_name: Option<LinkName>) -> Result<RequestId, NodeError> {
		self.call(|reply| Command::Pay { url, link_name, reply }).await
	}

	pub async fn confirm_payment(&self, request_id: RequestId, decision: ConfirmDecision) -> Result<(), NodeError> {
		self.call(|reply| Command::ConfirmPayment { request_id, decision, reply }).await
	}

	pub async fn list(&self) -> Result<NodeListing, NodeError> {
		self.call(|reply| Command::List { reply }).await
	}

	pub async fn get_balance(&self) -> Result<Amount, NodeError> {
		self.call(|reply| Command::GetBalance { reply }).await
	}

	pub async fn make_link(&self, name: LinkName, local_id: LocalId, remote_id: LocalId, remote_url: Option<String>) -> Result<(), NodeError> {
		self.call(|reply| Command::MakeLink { name, local_id, remote_id, remote_url, reply }).await
	}

	pub async fn deposit(&self, link: LocalId, variant: ChannelVariant, amount: Amount) -> Result<ChannelIndex, NodeError> {
		self.call(|reply| Command::Deposit { link, variant, amount, reply }).await
	}

	pub async fn withdraw(&self, link: LocalId, channel_index: ChannelIndex) -> Result<(), NodeError> {
		self.call(|reply| Command::Withdraw { link, channel_index, reply }).await
	}

	pub(crate) async fn peek_payer_link(&self, request_id: RequestId) -> Result<PayerLinkSnapshot, NodeError> {
		self.call(|reply| Command::PeekPayerLink { request_id, reply }).await
	}

	/// Requests a graceful stop. Returns once the loop has accepted the
	/// request; in-flight `receivedCommit` payments still finalise before
	/// the loop actually exits (§5).
	pub async fn stop(&self) {
		let (reply_tx, reply_rx) = oneshot::channel();
		if self.mailbox.send(Command::Stop { reply: reply_tx }).is_ok() {
			let _ = reply_rx.await;
		}
	}
}
