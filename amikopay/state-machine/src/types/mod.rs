//! Data types shared by every transition function: `Channel`, `Link`,
//! `MeetingPoint`, `Transaction`, `PayeeLink`, `PayerLink`, and the
//! aggregate `NodeState` (§3), plus the `StateChange`/`Event` closed
//! enums (§4.7).
pub mod channel;
pub mod event;
pub mod link;
pub mod meeting_point;
pub mod node;
pub mod payee_link;
pub mod payer_link;
pub mod state_change;
pub mod timer;
pub mod transaction;

pub use channel::{
	ChannelPhase,
	ChannelState,
	ChannelVariant,
};
pub use event::Event;
pub use link::LinkState;
pub use meeting_point::{
	MeetingPointState,
	PendingRoute,
};
pub use node::NodeState;
pub use payee_link::{
	PayeeLinkPhase,
	PayeeLinkState,
};
pub use payer_link::{
	PayerLinkPhase,
	PayerLinkState,
};
pub use state_change::StateChange;
pub use timer::TimerKey;
pub use transaction::{
	Reservation,
	ReserveSide,
	Transaction,
};
