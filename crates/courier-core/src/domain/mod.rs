//! Domain model (IDs, destinations, items, payloads, outcomes, errors).

pub mod destination;
pub mod errors;
pub mod ids;
pub mod item;
pub mod outcome;
pub mod payload;
pub mod state;

pub use self::destination::{Destination, Interest, Scope, ScopeName};
pub use self::errors::{ErrorKind, RelayError};
pub use self::ids::{ChannelId, DestinationId, ItemId, RecordId};
pub use self::item::{DeliveredItem, Item};
pub use self::outcome::{FanoutReport, MutationOutcome, PollReport, WorkerCommandOutcome};
pub use self::payload::DeliveryPayload;
pub use self::state::WorkerState;
