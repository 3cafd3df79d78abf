//! The single-writer event loop (§4.7): drains the network, fires due
//! timers, ticks the settlement watchdog, executes at most one foreign
//! command, persists if dirty, and sweeps terminal links to the pay log.
use std::{
	cmp::Reverse,
	collections::{
		BinaryHeap,
		HashMap,
	},
	path::PathBuf,
	sync::Arc,
	time::Duration,
};

use amikopay_messages::{
	Envelope,
	PaymentUrl,
};
use amikopay_persistence::{
	load_snapshot,
	save_snapshot,
	PayLog,
	PayLogEntry,
	PayLogRole,
};
use amikopay_primitives::types::{
	Amount,
	ChannelIndex,
	LinkName,
	LocalId,
	RequestId,
	Timestamp,
};
use amikopay_settlement::SettlementBackend;
use amikopay_state_machine::{
	state_transition,
	types::{
		state_change::{
			ChannelOpened,
			LinkCreated,
			PaymentConfirmed,
			PaymentDeclined,
			PaymentInitiated,
			PaymentRequested,
			TimerFired,
		},
		ChannelVariant,
		Event,
		NodeState,
		PayeeLinkPhase,
		PayerLinkPhase,
		StateChange,
		TimerKey,
	},
	views,
};
use amikopay_transport::Transport;
use tokio::sync::mpsc::{
	self,
	UnboundedReceiver,
};
use tracing::{
	debug,
	error,
	warn,
};

use crate::{
	command::{
		Command,
		ConfirmDecision,
		NodeHandle,
		NodeListing,
		PayeeSummary,
		PayerLinkSnapshot,
		PayerSummary,
	},
	errors::NodeError,
};

/// Where this node's durable state lives and how it is addressed on the
/// payment-URL network (§6 "Payment URL").
pub struct NodeConfig {
	pub host: String,
	pub port: u16,
	pub snapshot_path: PathBuf,
	pub paylog_path: PathBuf,
}

struct TimerHeap {
	entries: BinaryHeap<Reverse<(Timestamp, u64)>>,
	scheduled: HashMap<u64, (TimerKey, u64)>,
	generation: HashMap<TimerKey, u64>,
	next_seq: u64,
}

impl TimerHeap {
	fn new() -> Self {
		TimerHeap { entries: BinaryHeap::new(), scheduled: HashMap::new(), generation: HashMap::new(), next_seq: 0 }
	}

	/// Schedules `key` to fire at `fire_at`, invalidating any entry
	/// previously scheduled for it (lazy deletion — §9 "Timers").
	fn schedule(&mut self, key: TimerKey, fire_at: Timestamp) {
		let seq = self.next_seq;
		self.next_seq += 1;
		let generation = self.generation.entry(key.clone()).or_insert(0);
		*generation += 1;
		self.scheduled.insert(seq, (key, *generation));
		self.entries.push(Reverse((fire_at, seq)));
	}

	/// Invalidates any pending timer for `key` without touching the heap;
	/// stale pops are filtered out in [`Self::due`].
	fn cancel(&mut self, key: TimerKey) {
		*self.generation.entry(key).or_insert(0) += 1;
	}

	/// Pops every timer due at or before `now` whose generation still
	/// matches the current one for its key, i.e. has not been superseded
	/// or cancelled since it was scheduled.
	fn due(&mut self, now: Timestamp) -> Vec<TimerKey> {
		let mut fired = Vec::new();
		while let Some(Reverse((fire_at, seq))) = self.entries.peek().copied() {
			if fire_at > now {
				break
			}
			self.entries.pop();
			if let Some((key, scheduled_generation)) = self.scheduled.remove(&seq) {
				if self.generation.get(&key) == Some(&scheduled_generation) {
					fired.push(key);
				}
			}
		}
		fired
	}
}

/// One running node: owns its `NodeState`, a `Transport`, a
/// `SettlementBackend`, and the command mailbox external callers marshal
/// onto it.
pub struct Node {
	config: NodeConfig,
	state: NodeState,
	transport: Arc<dyn Transport>,
	settlement: Arc<dyn SettlementBackend>,
	paylog: PayLog,
	mailbox: UnboundedReceiver<Command>,
	inbox: UnboundedReceiver<Envelope>,
	timers: TimerHeap,
	dirty: bool,
	stop_requested: bool,
}

impl Node {
	/// Loads `config.snapshot_path` if present, otherwise starts from empty
	/// state, and spawns the transport's `process` loop as a background
	/// task feeding this node's inbox.
	pub async fn start(
		config: NodeConfig,
		transport: Arc<dyn Transport>,
		settlement: Arc<dyn SettlementBackend>,
	) -> Result<(Self, NodeHandle), NodeError> {
		let state = match load_snapshot(&config.snapshot_path) {
			Ok(state) => state,
			Err(amikopay_persistence::PersistenceError::NotFound(_)) => NodeState::new(),
			Err(other) => return Err(other.into()),
		};
		let paylog = PayLog::open(&config.paylog_path)?;
		transport.init().await?;

		let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
		let transport_for_process = transport.clone();
		tokio::spawn(async move {
			if let Err(err) = transport_for_process.process(inbox_tx).await {
				error!(?err, "transport process loop exited");
			}
		});

		let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
		let node = Node {
			config,
			state,
			transport,
			settlement,
			paylog,
			mailbox: mailbox_rx,
			inbox: inbox_rx,
			timers: TimerHeap::new(),
			dirty: false,
			stop_requested: false,
		};
		Ok((node, NodeHandle { mailbox: mailbox_tx }))
	}

	/// Runs the loop until `stop()` is called. §4.7's seven-step body.
	pub async fn run(mut self, now_fn: impl Fn() -> Timestamp) {
		loop {
			let now = now_fn();

			// 1. Drain inbound network events.
			while let Ok(envelope) = self.inbox.try_recv() {
				self.apply(StateChange::MessageReceived(amikopay_state_machine::types::state_change::MessageReceived { envelope }), now).await;
			}

			// 2. Dispatch due timers.
			for key in self.timers.due(now) {
				self.apply(StateChange::TimerFired(TimerFired { key, now }), now).await;
			}

			// 3. Tick the settlement watchdog — never escalated (§7 `BackendUnavailable`).
			if let Err(err) = self.settlement.watchdog_tick().await {
				warn!(?err, "settlement watchdog tick failed, will retry next iteration");
			}

			// 4. Execute at most one foreign command.
			let mut did_work = false;
			match self.mailbox.try_recv() {
				Ok(command) => {
					did_work = true;
					self.execute(command, now).await;
				},
				Err(mpsc::error::TryRecvError::Disconnected) => self.stop_requested = true,
				Err(mpsc::error::TryRecvError::Empty) => {},
			}

			// 5. Persist if dirty (§4.1).
			if self.dirty {
				match save_snapshot(&self.config.snapshot_path, &self.state) {
					Ok(()) => self.dirty = false,
					Err(err) => {
						// PersistenceFailure is fatal (§7): stop the loop.
						error!(?err, "persistence failure, stopping node loop");
						self.stop_requested = true;
					},
				}
			}

			// 6. Move terminal PayeeLinks/PayerLinks to the pay log and drop them.
			self.sweep_terminal_links(now);

			// 7. Exit if stop requested.
			if self.stop_requested {
				break
			}

			if !did_work {
				tokio::time::sleep(Duration::from_millis(25)).await;
			}
		}
	}

	async fn apply(&mut self, change: StateChange, now: Timestamp) -> Vec<Event> {
		match state_transition(&mut self.state, change.clone(), now) {
			Ok(events) => {
				self.handle_events(&events).await;
				events
			},
			Err(err) => {
				// ProtocolViolation et al. never crash the loop (§7).
				debug!(?err, ?change, "state transition rejected");
				Vec::new()
			},
		}
	}

	async fn handle_events(&mut self, events: &[Event]) {
		for event in events {
			match event {
				Event::SendEnvelope(send) => {
					if let Err(err) = self.transport.send(send.envelope.clone()).await {
						warn!(?err, recipient = ?send.envelope.recipient, "failed to send envelope");
					}
				},
				Event::PaymentSettled(settled) => {
					let entry = PayLogEntry {
						request_id: settled.request_id.clone(),
						role: PayLogRole::Payee,
						amount: settled.amount,
						receipt: self.state.payee_links.get(&settled.request_id).map(|link| link.receipt.clone()).unwrap_or_default(),
						transaction_id: Some(settled.transaction_id),
						phase: "Committed".to_string(),
						recorded_at: settled.settled_at,
					};
					if let Err(err) = self.paylog.append(&entry) {
						error!(?err, "failed to append pay log entry");
					}
				},
				Event::PersistenceRequested(_) => self.dirty = true,
				Event::TimerScheduled(scheduled) => self.timers.schedule(scheduled.key.clone(), scheduled.fire_at),
				Event::TimerCancelled(cancelled) => self.timers.cancel(cancelled.key.clone()),
			}
		}
	}

	fn sweep_terminal_links(&mut self, now: Timestamp) {
		let terminal_payees: Vec<RequestId> = self
			.state
			.payee_links
			.iter()
			.filter(|(_, link)| matches!(link.phase, PayeeLinkPhase::Committed | PayeeLinkPhase::Cancelled | PayeeLinkPhase::Expired))
			.map(|(request_id, _)| request_id.clone())
			.collect();
		for request_id in terminal_payees {
			if let Some(link) = self.state.payee_links.remove(&request_id) {
				self.state.payee_link_by_transaction.remove(&link.transaction_id);
				let entry = PayLogEntry {
					request_id,
					role: PayLogRole::Payee,
					amount: link.amount,
					receipt: link.receipt,
					transaction_id: Some(link.transaction_id),
					phase: format!("{:?}", link.phase),
					recorded_at: now,
				};
				if let Err(err) = self.paylog.append(&entry) {
					error!(?err, "failed to append pay log entry for swept payee link");
				}
			}
		}

		let terminal_payers: Vec<RequestId> = self
			.state
			.payer_links
			.iter()
			.filter(|(_, link)| matches!(link.phase, PayerLinkPhase::Committed | PayerLinkPhase::Cancelled | PayerLinkPhase::TimedOut))
			.map(|(request_id, _)| request_id.clone())
			.collect();
		for request_id in terminal_payers {
			if let Some(link) = self.state.payer_links.remove(&request_id) {
				if let Some(transaction_id) = link.transaction_id {
					self.state.payer_link_by_transaction.remove(&transaction_id);
				}
				let entry = PayLogEntry {
					request_id,
					role: PayLogRole::Payer,
					amount: link.amount,
					receipt: link.receipt.unwrap_or_default(),
					transaction_id: link.transaction_id,
					phase: format!("{:?}", link.phase),
					recorded_at: now,
				};
				if let Err(err) = self.paylog.append(&entry) {
					error!(?err, "failed to append pay log entry for swept payer link");
				}
			}
		}
	}

	async fn execute(&mut self, command: Command, now: Timestamp) {
		match command {
			Command::Request { amount, receipt, candidate_meeting_points, reply } => {
				let request_id = RequestId::random();
				let change = StateChange::PaymentRequested(PaymentRequested { request_id: request_id.clone(), amount, receipt, candidate_meeting_points, requested_at: now });
				let result = match state_transition(&mut self.state, change, now) {
					Ok(events) => {
						self.handle_events(&events).await;
						Ok(PaymentUrl::new(self.config.host.clone(), self.config.port, request_id))
					},
					Err(err) => Err(err.into()),
				};
				let _ = reply.send(result);
			},
			Command::Pay { url, link_name, reply } => {
				let result = self.do_pay(url, link_name, now).await;
				let _ = reply.send(result);
			},
			Command::ConfirmPayment { request_id, decision, reply } => {
				let change = match decision {
					ConfirmDecision::Accept { meeting_point_id } => StateChange::PaymentConfirmed(PaymentConfirmed { request_id, meeting_point_id }),
					ConfirmDecision::Decline => StateChange::PaymentDeclined(PaymentDeclined { request_id }),
				};
				let result = match state_transition(&mut self.state, change, now) {
					Ok(events) => {
						self.handle_events(&events).await;
						Ok(())
					},
					Err(err) => Err(err.into()),
				};
				let _ = reply.send(result);
			},
			Command::List { reply } => {
				let payers = self
					.state
					.payer_links
					.values()
					.map(|link| PayerSummary { request_id: link.request_id.clone(), amount: link.amount, phase: link.phase })
					.collect();
				let payees = self
					.state
					.payee_links
					.values()
					.map(|link| PayeeSummary { request_id: link.request_id.clone(), amount: link.amount, phase: link.phase })
					.collect();
				let _ = reply.send(Ok(NodeListing { payers, payees }));
			},
			Command::GetBalance { reply } => {
				let _ = reply.send(Ok(views::total_local_balance(&self.state)));
			},
			Command::MakeLink { name, local_id, remote_id, remote_url, reply } => {
				let change = StateChange::LinkCreated(LinkCreated { name, local_id, remote_id, remote_url });
				let result = match state_transition(&mut self.state, change, now) {
					Ok(events) => {
						self.handle_events(&events).await;
						Ok(())
					},
					Err(err) => Err(err.into()),
				};
				let _ = reply.send(result);
			},
			Command::Deposit { link, variant, amount, reply } => {
				let result = self.do_deposit(link, variant, amount, now).await;
				let _ = reply.send(result);
			},
			Command::Withdraw { link, channel_index, reply } => {
				let result = self.do_withdraw(&link, channel_index);
				let _ = reply.send(result);
			},
			Command::PeekPayerLink { request_id, reply } => {
				let result = self
					.state
					.payer_links
					.get(&request_id)
					.map(|link| PayerLinkSnapshot { phase: link.phase, amount: link.amount, receipt: link.receipt.clone() })
					.ok_or(NodeError::UnknownPayerLink(request_id));
				let _ = reply.send(result);
			},
			Command::Stop { reply } => {
				self.stop_requested = true;
				let _ = reply.send(());
			},
		}
	}

	async fn do_pay(&mut self, url: PaymentUrl, link_name: Option<LinkName>, now: Timestamp) -> Result<RequestId, NodeError> {
		let remote_link = match link_name {
			Some(name) => views::link_by_name(&self.state, &name).map(|link| link.local_id.clone()).ok_or(NodeError::UnknownLink(name))?,
			None => {
				let authority = format!("{}:{}", url.host, url.port);
				self.state
					.links
					.values()
					.find(|link| link.remote_url.as_deref() == Some(authority.as_str()))
					.map(|link| link.local_id.clone())
					.ok_or(NodeError::UnresolvedPeer(authority))?
			},
		};
		if self.state.payer_links.contains_key(&url.request_id) {
			return Err(NodeError::AlreadyInProgress(url.request_id))
		}
		let request_id = url.request_id.clone();
		let change = StateChange::PaymentInitiated(PaymentInitiated { request_id: request_id.clone(), remote_link, amount: 0 });
		let events = state_transition(&mut self.state, change, now)?;
		self.handle_events(&events).await;
		Ok(request_id)
	}

	async fn do_deposit(&mut self, link: LocalId, variant: ChannelVariant, amount: Amount, now: Timestamp) -> Result<ChannelIndex, NodeError> {
		let channel_index = self.state.links.get(&link).map(|link| link.channels.len()).ok_or_else(|| NodeError::UnknownLink(LinkName(link.0.clone())))?;
		let change = StateChange::ChannelOpened(ChannelOpened { link, variant, amount_local: amount, amount_remote: 0 });
		let events = state_transition(&mut self.state, change, now)?;
		self.handle_events(&events).await;
		Ok(channel_index)
	}

	fn do_withdraw(&mut self, link: &LocalId, channel_index: ChannelIndex) -> Result<(), NodeError> {
		let link_state = self.state.links.get_mut(link).ok_or_else(|| NodeError::UnknownLink(LinkName(link.0.clone())))?;
		let channel = link_state.channel(channel_index).ok_or_else(|| NodeError::UnknownChannel { link: link.clone(), channel_index })?;
		if !channel.outgoing_reserved.is_empty() || !channel.outgoing_locked.is_empty() || !channel.incoming_reserved.is_empty() || !channel.incoming_locked.is_empty() {
			return Err(NodeError::ChannelBusy { link: link.clone(), channel_index })
		}
		link_state.channels.remove(channel_index);
		self.dirty = true;
		Ok(())
	}
}
