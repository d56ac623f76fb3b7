//! Data Transfer Objects for persistence.
//!
//! DTOs are private to the infrastructure layer. They absorb schema drift so
//! the domain types in `callbot-core` stay strict.
//!
//! ### Session Version History
//! - **1.0.0**: Initial schema

mod session;

pub use session::{SESSION_DTO_VERSION, SessionDto, normalize_items};
