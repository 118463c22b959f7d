//! Editor and feed behavior on the client side
//!
//! Plain state machines without IO, the caller feeds them events and time

pub mod autosave;
pub mod counter;
pub mod feed;
pub mod replacements;
