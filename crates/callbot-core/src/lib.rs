//! Domain layer of the callbot.
//!
//! Types and pure logic for the phone interview: the vulnerability
//! registry, answer classification results and keyword rules, the per-call
//! session, the outcome report and the interfaces of every external
//! collaborator. Nothing in this crate performs I/O.

pub mod case_file;
pub mod classification;
pub mod collaborator;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod session;

pub use error::{CallbotError, Result};
