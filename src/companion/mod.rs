//! Companion personas and scripted dialogue.
//!
//! [`dialogue::DialogueSelector`] picks a scripted line from the static tables in
//! [`tables`]; [`persona`] supplies the prompt and canned replies the chat path
//! needs.

pub mod dialogue;
pub mod persona;
pub mod tables;
pub mod types;
