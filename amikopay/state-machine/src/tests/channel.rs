use amikopay_primitives::types::TransactionId;

use crate::{
	errors::ChannelError,
	types::{
		ChannelState,
		ChannelVariant,
	},
};

fn tx(byte: u8) -> TransactionId {
	TransactionId([byte; 20])
}

#[test]
fn reserve_outgoing_respects_local_balance() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	assert!(channel.reserve_outgoing(tx(1), 100).is_ok());
	assert_eq!(channel.reserve_outgoing(tx(2), 1), Err(ChannelError::InsufficientCapacity { transaction_id: tx(2), amount: 1 }));
}

#[test]
fn reserve_incoming_respects_remote_balance() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 50);
	assert!(channel.reserve_incoming(tx(1), 50).is_ok());
	assert_eq!(channel.reserve_incoming(tx(2), 1), Err(ChannelError::InsufficientCapacity { transaction_id: tx(2), amount: 1 }));
}

#[test]
fn double_reservation_is_rejected() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	channel.reserve_outgoing(tx(1), 10).unwrap();
	assert_eq!(channel.reserve_outgoing(tx(1), 10), Err(ChannelError::AlreadyPresent(tx(1))));
	assert_eq!(channel.reserve_incoming(tx(1), 10), Err(ChannelError::AlreadyPresent(tx(1))));
}

#[test]
fn lock_without_reservation_fails() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	assert_eq!(channel.lock_outgoing(tx(1)), Err(ChannelError::NotReserved(tx(1))));
	assert_eq!(channel.lock_incoming(tx(1)), Err(ChannelError::NotReserved(tx(1))));
}

#[test]
fn commit_without_lock_fails() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	channel.reserve_outgoing(tx(1), 10).unwrap();
	assert_eq!(channel.commit_outgoing(tx(1)), Err(ChannelError::NotLocked(tx(1))));
}

#[test]
fn reserve_lock_commit_outgoing_moves_balance() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 50);
	channel.reserve_outgoing(tx(1), 30).unwrap();
	channel.lock_outgoing(tx(1)).unwrap();
	let moved = channel.commit_outgoing(tx(1)).unwrap();
	assert_eq!(moved, 30);
	assert_eq!(channel.amount_local, 70);
	assert_eq!(channel.amount_remote, 80);
	assert_eq!(channel.outgoing_capacity_used(), 0);
}

#[test]
fn reserve_lock_commit_incoming_moves_balance() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 50, 100);
	channel.reserve_incoming(tx(1), 30).unwrap();
	channel.lock_incoming(tx(1)).unwrap();
	let moved = channel.commit_incoming(tx(1)).unwrap();
	assert_eq!(moved, 30);
	assert_eq!(channel.amount_local, 80);
	assert_eq!(channel.amount_remote, 70);
	assert_eq!(channel.incoming_capacity_used(), 0);
}

#[test]
fn rollback_releases_capacity_without_moving_balance() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	channel.reserve_outgoing(tx(1), 40).unwrap();
	channel.rollback(tx(1)).unwrap();
	assert_eq!(channel.outgoing_capacity_used(), 0);
	assert_eq!(channel.amount_local, 100);
	assert_eq!(channel.amount_remote, 100);
	// Capacity is free again for a fresh reservation under the same id.
	assert!(channel.reserve_outgoing(tx(1), 40).is_ok());
}

#[test]
fn rollback_of_a_lock_also_releases_capacity() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	channel.reserve_incoming(tx(1), 40).unwrap();
	channel.lock_incoming(tx(1)).unwrap();
	channel.rollback(tx(1)).unwrap();
	assert_eq!(channel.incoming_capacity_used(), 0);
	assert_eq!(channel.amount_local, 100);
	assert_eq!(channel.amount_remote, 100);
}

#[test]
fn rollback_of_unknown_transaction_fails() {
	let mut channel = ChannelState::new(ChannelVariant::Plain, 100, 100);
	assert_eq!(channel.rollback(tx(9)), Err(ChannelError::NotFound(tx(9))));
}
