//! mmle-core - Key-Value Persistence Facade
//!
//! One API over two mutually-exclusive storage substrates: a
//! capacity-bound local key-value store and a fallback cookie jar.
//! Which substrate backs a session is decided once, by a zero-risk
//! write-then-delete probe; fallback is silent and total. Values run
//! through an optional codec pipeline (deflate compression, or
//! identity pass-through) and can be wrapped with an expiration
//! timestamp that is enforced lazily, on read.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               mmle-core                      │
//! ├─────────────────────────────────────────────┤
//! │  Expiry wrapper          │ lazy purge-on-read│
//! │  Key-value operations    │ one uniform API   │
//! │  Codec pipeline          │ identity/deflate  │
//! │  Backend selector        │ probe + fallback  │
//! ├─────────────────────────────────────────────┤
//! │  LocalStore │ CookieJar  │ injectable Clock  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use mmle_core::{MemoryCookieJar, MemoryLocalStore, Storage, SystemClock};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mmle_core::StorageResult<()> {
//! let clock = Arc::new(SystemClock);
//! let local = Arc::new(MemoryLocalStore::new());
//! let jar = Arc::new(MemoryCookieJar::new(clock));
//!
//! let storage = Storage::initialize(local, jar);
//! storage.set("greeting", &"hello").await?;
//! assert_eq!(storage.get("greeting").await?, Some("hello".into()));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Operations keep the deferred-result contract even though substrate
// calls are synchronous underneath.
#![allow(clippy::unused_async)]

pub mod constants;
pub mod dst;
pub mod storage;
pub mod substrate;

// Re-export common types
pub use constants::*;
pub use dst::{Clock, SimClock, SystemClock};
pub use storage::{
    probe_local_store, Backend, BackendConfig, Codec, Compressor, DeflateCompressor, Storage,
    StorageBuilder, StorageError, StorageResult,
};
pub use substrate::{parse_pairs, CookieJar, LocalStore, MemoryCookieJar, MemoryLocalStore};
