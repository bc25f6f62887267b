//! Meeting state machine.
//!
//! A [`Meeting`] owns the raw transcript, the minutes items, the
//! chair/voter registries and the voting sub-protocol. Live meetings are
//! held by a [`MeetingRegistry`], one per channel and network.

mod commands;
pub mod error;
#[allow(clippy::module_inception)]
mod meeting;
pub mod registry;
pub mod status;
pub mod transport;
pub mod vote;

pub use error::{MeetingError, RegistryError};
pub use meeting::{Meeting, MeetingOptions};
pub use registry::{MeetingKey, MeetingRegistry, RecentMeeting};
pub use status::MeetingPhase;
pub use transport::{ChatTransport, NullTransport, Outgoing, RecordingTransport};
pub use vote::{OpenVote, VoteOutcome, VoteResult, VoteState, VoteTally};
