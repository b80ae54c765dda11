//! Client-side lifecycle polling.

pub mod poller;

pub use poller::{PollConfig, PollHooks, PollState, StatusPoller};
