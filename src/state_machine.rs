//! Conversation state machine
//!
//! Per-user flow state, typed events and the engine that advances
//! flows against the catalog store. Split the same way throughout:
//! `state` and `event` are pure data, `validate` is pure functions,
//! `engine`/`admin` do the actual advancing.

mod admin;
pub mod engine;
pub mod event;
#[cfg(test)]
mod proptests;
pub mod state;
pub mod validate;

pub use engine::{Engine, Outcome, Reply, UserRef};
pub use event::{CallbackAction, Command, Event};
pub use state::Flow;
