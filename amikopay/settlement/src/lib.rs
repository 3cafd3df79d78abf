//! The settlement-layer capability a node depends on to move value it has
//! promised over its channels onto/off the underlying chain (§1: on-chain
//! settlement logic itself is out of scope, but the node loop needs
//! *something* to poll and some way to quote a new deposit address, so this
//! crate fixes the shape of that capability as a narrow async trait.
pub mod errors;
pub mod mock;

use async_trait::async_trait;

pub use errors::SettlementError;
pub use mock::MockSettlementBackend;

/// A settled on-chain (or otherwise external) transaction observed by a
/// backend, as returned by `list_transactions`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettlementTransaction {
	pub id: String,
	pub amount: amikopay_primitives::types::Amount,
	pub confirmed: bool,
}

/// Capability a node uses to fund/drain its channels and watch the
/// settlement layer for events relevant to open channels. Distinct from
/// `amikopay_transport::Transport`: this is the chain-facing side, that is
/// the peer-facing side.
#[async_trait]
pub trait SettlementBackend: Send + Sync {
	/// Current spendable balance held by this node at the settlement layer.
	async fn get_balance(&self) -> Result<amikopay_primitives::types::Amount, SettlementError>;

	/// Issues a fresh receive address/identifier a counterparty can be asked
	/// to fund a channel towards.
	async fn get_new_address(&self) -> Result<String, SettlementError>;

	/// Broadcasts a pre-signed raw transaction, returning its id.
	async fn send_raw_transaction(&self, raw_tx: &str) -> Result<String, SettlementError>;

	/// Lists transactions this backend has observed, most recent first.
	async fn list_transactions(&self) -> Result<Vec<SettlementTransaction>, SettlementError>;

	/// Polled once per node-loop iteration (§4.7 step 3). A no-op for
	/// backends with nothing to watch; a real chain backend would use this
	/// to notice disputed/expired TCDs and react (out of scope here).
	async fn watchdog_tick(&self) -> Result<(), SettlementError>;
}
