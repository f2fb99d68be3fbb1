//! Companion core for a visual-novel themed focus timer.
//!
//! Kizuna owns the three decision components behind the companion screens:
//!
//! | Component | Job | State |
//! |-----------|-----|-------|
//! | **Dialogue selector** | Pick a scripted line from mood, affinity, streak, and session signals | Static tables |
//! | **Moderation gate** | Block unsafe or role-breaking text before and after the chat model | Static lists + optional remote calls |
//! | **Request cache** | Collapse duplicate chat submissions inside a short window | TTL map, bounded capacity |
//!
//! # Architecture
//!
//! - **Dialogue**: first-match context rules, then a uniform draw over matching
//!   general rules, then a fixed fallback line
//! - **Moderation**: keyword list → regex patterns → remote classifier → remote
//!   semantic check, with both remote layers failing open
//! - **Chat**: moderation, dedup cache, OpenAI-compatible model call, canned
//!   in-character fallbacks
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP, plus a CLI
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`companion`]: Personas, rule tables, and the dialogue selector
//! - [`moderation`]: The layered moderation gate
//! - [`chat`]: Chat service and request dedup cache
//! - [`remote`]: Classifier and chat-model traits with the OpenAI client

pub mod app;
pub mod chat;
pub mod clock;
pub mod companion;
pub mod config;
pub mod error;
pub mod moderation;
pub mod remote;
