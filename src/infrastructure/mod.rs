// src/infrastructure/mod.rs
pub mod clock;
pub mod config;
pub mod file_store;
pub mod identity;
pub mod memory;
pub mod renderer;
pub mod sqlite;

pub use clock::ServerClock;
pub use config::Config;
pub use file_store::LocalFileStore;
pub use identity::ConfiguredIdentity;
pub use memory::InMemoryBackend;
pub use renderer::ContentRenderer;
pub use sqlite::SqliteBackend;
