//! Feature implementations for vimaya.
//!
//! - Focus sessions: timekeeping, lifecycle handling, reporting
//! - Friend presence: polling the active-session listing and diffing it
//!   into join and leave events

pub mod focus;
pub mod presence;
