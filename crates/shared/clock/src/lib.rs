//! Agora Clock Infrastructure
//!
//! Time sources for arrival and processing timestamps:
//!
//! - [`SystemClock`]: wall-clock microseconds that never run backwards
//! - [`ManualClock`]: time that only moves when told to, for tests and replays
//!
//! ## Usage
//!
//! ```
//! use agora_clock::{Clock, ManualClock};
//!
//! // Every read advances by one microsecond, so arrivals never tie
//! let clock = ManualClock::stepping(1_000, 1);
//! assert_eq!(clock.now().as_micros(), 1_000);
//! assert_eq!(clock.now().as_micros(), 1_001);
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use agora_ports::Clock;
