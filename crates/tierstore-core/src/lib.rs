//! Core domain types shared by the tierstore tiers and migrator.

pub mod clock;
pub mod error;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use record::{validate_id, Payload, Record};
