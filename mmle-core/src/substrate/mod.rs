//! Substrate - The Two Storage Surfaces Behind the Facade
//!
//! TigerStyle: abstract substrates with simulation-friendly in-memory
//! implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │   LocalStore trait    │      │   CookieJar trait     │
//! │  (key-value, quota)   │      │ (one string surface)  │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │                              │
//! ┌──────────┴───────────┐      ┌──────────┴───────────┐
//! │   MemoryLocalStore    │      │   MemoryCookieJar     │
//! │  (capacity-bound)     │      │ (attribute-parsing,   │
//! │                       │      │  native expiry)       │
//! └──────────────────────┘      └──────────────────────┘
//! ```
//!
//! The facade treats both as dumb external surfaces: the local store is a
//! plain key-value map that may refuse writes over quota; the cookie jar
//! is a single concatenated string that must be re-parsed on every read.

mod cookie;
mod local;

pub use cookie::{parse_pairs, CookieJar, MemoryCookieJar};
pub use local::{LocalStore, MemoryLocalStore};
