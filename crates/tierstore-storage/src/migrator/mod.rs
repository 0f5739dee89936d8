//! Threshold-driven migration between the hot and cold tiers
//!
//! Records move between tiers based on time since last access:
//! - **Hot Tier** (RAM): recently accessed records, volatile
//! - **Cold Tier** (local disk): idle records, one JSON file each, durable
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Accessor                          │
//! │   get(): hot → cold (+ detached pre-warm into hot)       │
//! │   save(): hot only                                       │
//! │        │                              │                  │
//! │     Hot Tier                      Cold Tier              │
//! │     (MemoryTier)                  (FileTier)             │
//! │        │                              │                  │
//! │        └──────────────┬───────────────┘                  │
//! │                       ↑                                  │
//! │                   Migrator                               │
//! │           (runs every `interval_secs`)                   │
//! │  - Demote hot → cold (idle > cold_threshold_secs)        │
//! │  - Promote cold → hot (idle <= hot_threshold_secs)       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The migrator talks to the tiers directly and never goes through the
//! accessor. It never holds one tier's lock while calling into the other.

mod manager;
mod policy;

pub use manager::{MigrationReport, Migrator};
pub use policy::MigrationPolicy;
