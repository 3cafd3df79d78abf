//! The amikopay routing and payment-channel state machine (§3, §4).
//!
//! Every transition has the shape `(state, state_change) -> Result<events,
//! StateTransitionError>`: given the current `NodeState` and one
//! `StateChange`, it mutates the state in place and returns the `Event`s
//! the caller (the node event loop, see `amikopay-node`) must carry out —
//! sending messages, persisting state, scheduling timers. No I/O happens
//! in this crate.
pub mod constants;
pub mod errors;
pub mod machine;
#[cfg(test)]
mod tests;
pub mod types;
pub mod views;

pub use errors::{
	ChannelError,
	StateTransitionError,
};
pub use machine::state_transition;
pub use types::{
	Event,
	NodeState,
	StateChange,
};
