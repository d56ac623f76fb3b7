pub mod config_loader;
pub mod dto;
pub mod file_session_store;
pub mod memory_session_store;
pub mod paths;
pub mod storage;

pub use crate::config_loader::ConfigLoader;
pub use crate::file_session_store::FileSessionStore;
pub use crate::memory_session_store::InMemorySessionStore;
pub use crate::paths::CallbotPaths;
