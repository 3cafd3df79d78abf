//! An in-memory `SettlementBackend`, for tests and for running a node
//! without a real chain connection.
use amikopay_primitives::types::Amount;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
	errors::SettlementError,
	SettlementBackend,
	SettlementTransaction,
};

struct State {
	balance: Amount,
	next_address: u64,
	transactions: Vec<SettlementTransaction>,
	ticks: u64,
}

pub struct MockSettlementBackend {
	state: Mutex<State>,
}

impl MockSettlementBackend {
	pub fn new(initial_balance: Amount) -> Self {
		Self { state: Mutex::new(State { balance: initial_balance, next_address: 0, transactions: Vec::new(), ticks: 0 }) }
	}

	/// Test/operator hook: credits the mock backend as if a deposit had
	/// confirmed, without going through `send_raw_transaction`.
	pub fn credit(&self, amount: Amount) {
		let mut state = self.state.lock();
		state.balance += amount;
	}

	pub fn ticks(&self) -> u64 {
		self.state.lock().ticks
	}
}

#[async_trait]
impl SettlementBackend for MockSettlementBackend {
	async fn get_balance(&self) -> Result<Amount, SettlementError> {
		Ok(self.state.lock().balance)
	}

	async fn get_new_address(&self) -> Result<String, SettlementError> {
		let mut state = self.state.lock();
		state.next_address += 1;
		Ok(format!("mock-address-{}", state.next_address))
	}

	async fn send_raw_transaction(&self, raw_tx: &str) -> Result<String, SettlementError> {
		if raw_tx.is_empty() {
			return Err(SettlementError::InvalidTransaction("empty raw transaction".to_string()))
		}
		let mut state = self.state.lock();
		let id = format!("mock-tx-{}", state.transactions.len());
		state.transactions.push(SettlementTransaction { id: id.clone(), amount: 0, confirmed: true });
		Ok(id)
	}

	async fn list_transactions(&self) -> Result<Vec<SettlementTransaction>, SettlementError> {
		Ok(self.state.lock().transactions.clone())
	}

	async fn watchdog_tick(&self) -> Result<(), SettlementError> {
		let mut state = self.state.lock();
		state.ticks += 1;
		debug!(ticks = state.ticks, "watchdog tick");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn credit_and_get_balance_round_trip() {
		let backend = MockSettlementBackend::new(0);
		backend.credit(100);
		assert_eq!(backend.get_balance().await.unwrap(), 100);
	}

	#[tokio::test]
	async fn new_addresses_are_distinct() {
		let backend = MockSettlementBackend::new(0);
		let a = backend.get_new_address().await.unwrap();
		let b = backend.get_new_address().await.unwrap();
		assert_ne!(a, b);
	}

	#[tokio::test]
	async fn sending_an_empty_transaction_is_rejected() {
		let backend = MockSettlementBackend::new(0);
		assert!(backend.send_raw_transaction("").await.is_err());
	}

	#[tokio::test]
	async fn watchdog_tick_counts_ticks() {
		let backend = MockSettlementBackend::new(0);
		backend.watchdog_tick().await.unwrap();
		backend.watchdog_tick().await.unwrap();
		assert_eq!(backend.ticks(), 2);
	}
}
