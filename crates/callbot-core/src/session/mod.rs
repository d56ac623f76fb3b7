//! Session domain module.
//!
//! This module contains the per-call conversation state, the interview
//! phases and the store interface.
//!
//! # Module Structure
//!
//! - `model`: Core session model (`Session`)
//! - `phase`: Interview phases (`Phase`, `DetailStep`, `DetailDraft`)
//! - `turn`: Recorded script entries (`ConversationTurn`)
//! - `store`: Store trait for session persistence

mod model;
mod phase;
mod store;
mod turn;

pub use model::Session;
pub use phase::{DetailDraft, DetailStep, Phase};
pub use store::SessionStore;
pub use turn::{ConversationTurn, render_script};
