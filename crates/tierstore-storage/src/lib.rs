//! Two-tier record store: a volatile in-memory hot tier, a durable
//! file-backed cold tier, a read-through accessor over both, and a
//! background migrator that moves records by recency of access.

pub mod accessor;
pub mod error;
pub mod file;
pub mod memory;
pub mod migrator;
pub mod tier;

pub use accessor::Accessor;
pub use error::{Error, Result};
pub use file::FileTier;
pub use memory::MemoryTier;
pub use migrator::{MigrationPolicy, MigrationReport, Migrator};
pub use tier::Storage;
