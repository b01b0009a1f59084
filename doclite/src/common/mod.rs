//! Common types shared by every part of the engine.

mod constants;
mod value;

pub use constants::*;
pub use value::*;

/// Returns the current time in milliseconds since the unix epoch, or zero if
/// the clock reports a time before the epoch.
pub fn get_current_time_or_zero() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
