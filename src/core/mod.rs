//! Core abstractions shared across features.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
