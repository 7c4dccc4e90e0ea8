//! Conversation subdomain: speakers, turns, transcripts and run state.
//!
//! - [`value_objects::Speaker`] — Model A or Model B
//! - [`entities::Turn`] — one immutable message with timing and usage
//! - [`entities::Transcript`] — append-only, strictly alternating sequence of turns
//! - [`run_state::RunState`] — lifecycle of one run (`Idle → Running → terminal`)

pub mod entities;
pub mod run_state;
pub mod value_objects;
