//! DST - Deterministic Simulation Testing Support
//!
//! TigerStyle: all time observation goes through an injectable interface.
//!
//! The facade never calls the system clock directly. Production code
//! injects [`SystemClock`]; tests inject [`SimClock`] and advance it
//! explicitly, which makes TTL expiry fully deterministic.

mod clock;

pub use clock::{Clock, SimClock, SystemClock};
