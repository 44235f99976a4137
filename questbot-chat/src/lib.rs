//! # questbot-chat — chat integration for questbot
//!
//! Sits between a chat transport and `questbot-core`:
//!
//! ```text
//! transport ──(key, text)──▶ GameEngine ──▶ SessionStore ──▶ Conversation
//!                                                  │
//!                                    state machine + PlayerSession
//!                                                  │
//! transport ◀──(text, image, menu)── render ◀──────┘
//! ```
//!
//! ## Modules
//!
//! - `state` — interaction states and their transient context
//! - `machine` — the per-conversation state machine
//! - `menu` — button labels and layouts
//! - `render` — display text
//! - `store` — injected session store
//! - `engine` — the transport-facing facade

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod machine;
pub mod menu;
pub mod render;
pub mod state;
pub mod store;

pub use engine::{GameEngine, Response};
pub use error::ChatError;
pub use machine::{Conversation, Env, Reply};
pub use menu::Menu;
pub use state::{Context, InteractionState};
pub use store::{ConversationHandle, InMemorySessionStore, SessionStore};
