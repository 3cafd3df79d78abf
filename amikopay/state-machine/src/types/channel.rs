//! A bilateral credit channel between this node and one neighbour (§4.2).
use std::collections::HashMap;

use amikopay_primitives::types::{
	Amount,
	TransactionId,
};
use serde::{
	Deserialize,
	Serialize,
};

use crate::errors::ChannelError;

/// The settlement mechanism backing a channel (§3, GLOSSARY).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChannelVariant {
	/// No on-chain enforcement; balances move purely on mutual trust.
	Plain,
	/// Backed by a Transaction Conditions Document enforceable on-chain.
	Tcd,
}

/// Lifecycle phase of a channel, independent of its pending transactions
/// (§4.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChannelPhase {
	/// Created but not yet funded.
	Initial,
	/// A deposit has been requested from the settlement backend.
	Depositing,
	/// Funded and available for routing.
	Ready,
}

/// One side of a bilateral channel, as tracked locally by this node. The
/// neighbour keeps its own, independent mirror of the same credit line.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChannelState {
	pub variant: ChannelVariant,
	pub phase: ChannelPhase,
	/// What this node can still push to the neighbour.
	pub amount_local: Amount,
	/// What the neighbour has pushed, or committed to push, to this node.
	pub amount_remote: Amount,
	pub outgoing_reserved: HashMap<TransactionId, Amount>,
	pub incoming_reserved: HashMap<TransactionId, Amount>,
	pub outgoing_locked: HashMap<TransactionId, Amount>,
	pub incoming_locked: HashMap<TransactionId, Amount>,
}

impl ChannelState {
	pub fn new(variant: ChannelVariant, amount_local: Amount, amount_remote: Amount) -> Self {
		ChannelState {
			variant,
			phase: ChannelPhase::Initial,
			amount_local,
			amount_remote,
			outgoing_reserved: HashMap::new(),
			incoming_reserved: HashMap::new(),
			outgoing_locked: HashMap::new(),
			incoming_locked: HashMap::new(),
		}
	}

	fn is_known(&self, transaction_id: &TransactionId) -> bool {
		self.outgoing_reserved.contains_key(transaction_id)
			|| self.incoming_reserved.contains_key(transaction_id)
			|| self.outgoing_locked.contains_key(transaction_id)
			|| self.incoming_locked.contains_key(transaction_id)
	}

	pub fn outgoing_capacity_used(&self) -> Amount {
		self.outgoing_reserved.values().sum::<Amount>() + self.outgoing_locked.values().sum::<Amount>()
	}

	pub fn incoming_capacity_used(&self) -> Amount {
		self.incoming_reserved.values().sum::<Amount>() + self.incoming_locked.values().sum::<Amount>()
	}

	/// Reserves `amount` of this node's own pushable capacity (§4.2).
	pub fn reserve_outgoing(&mut self, transaction_id: TransactionId, amount: Amount) -> Result<(), ChannelError> {
		if self.is_known(&transaction_id) {
			return Err(ChannelError::AlreadyPresent(transaction_id))
		}
		if amount > self.amount_local.saturating_sub(self.outgoing_capacity_used()) {
			return Err(ChannelError::InsufficientCapacity { transaction_id, amount })
		}
		self.outgoing_reserved.insert(transaction_id, amount);
		Ok(())
	}

	/// Reserves `amount` of capacity the neighbour has pledged (§4.2).
	pub fn reserve_incoming(&mut self, transaction_id: TransactionId, amount: Amount) -> Result<(), ChannelError> {
		if self.is_known(&transaction_id) {
			return Err(ChannelError::AlreadyPresent(transaction_id))
		}
		if amount > self.amount_remote.saturating_sub(self.incoming_capacity_used()) {
			return Err(ChannelError::InsufficientCapacity { transaction_id, amount })
		}
		self.incoming_reserved.insert(transaction_id, amount);
		Ok(())
	}

	pub fn lock_outgoing(&mut self, transaction_id: TransactionId) -> Result<(), ChannelError> {
		let amount = self
			.outgoing_reserved
			.remove(&transaction_id)
			.ok_or(ChannelError::NotReserved(transaction_id))?;
		self.outgoing_locked.insert(transaction_id, amount);
		Ok(())
	}

	pub fn lock_incoming(&mut self, transaction_id: TransactionId) -> Result<(), ChannelError> {
		let amount = self
			.incoming_reserved
			.remove(&transaction_id)
			.ok_or(ChannelError::NotReserved(transaction_id))?;
		self.incoming_locked.insert(transaction_id, amount);
		Ok(())
	}

	/// Completes a locked outgoing payment: moves `amount` from this node's
	/// own balance to the neighbour's (§4.2).
	pub fn commit_outgoing(&mut self, transaction_id: TransactionId) -> Result<Amount, ChannelError> {
		let amount = self
			.outgoing_locked
			.remove(&transaction_id)
			.ok_or(ChannelError::NotLocked(transaction_id))?;
		self.amount_local -= amount;
		self.amount_remote += amount;
		Ok(amount)
	}

	/// Completes a locked incoming payment: moves `amount` from the
	/// neighbour's balance to this node's own (§4.2).
	pub fn commit_incoming(&mut self, transaction_id: TransactionId) -> Result<Amount, ChannelError> {
		let amount = self
			.incoming_locked
			.remove(&transaction_id)
			.ok_or(ChannelError::NotLocked(transaction_id))?;
		self.amount_remote -= amount;
		self.amount_local += amount;
		Ok(amount)
	}

	/// Drops `transaction_id` from whichever of the four maps holds it.
	/// Never changes a balance: a locked-but-uncommitted transaction simply
	/// releases the capacity it had claimed (§4.2).
	pub fn rollback(&mut self, transaction_id: TransactionId) -> Result<(), ChannelError> {
		if self.outgoing_reserved.remove(&transaction_id).is_some() {
			return Ok(())
		}
		if self.incoming_reserved.remove(&transaction_id).is_some() {
			return Ok(())
		}
		if self.outgoing_locked.remove(&transaction_id).is_some() {
			return Ok(())
		}
		if self.incoming_locked.remove(&transaction_id).is_some() {
			return Ok(())
		}
		Err(ChannelError::NotFound(transaction_id))
	}
}
