//! Storage - Facade, Codec Pipeline, and Backend Selection
//!
//! TigerStyle: one facade instance owns the whole selection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Storage                              │
//! │  set / get / remove / keys / removeAll / *WithExpire         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BackendConfig (probe-selected backend + bound codecs)       │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │        Codec (local)          │        Codec (cookie)        │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │       LocalStore trait        │        CookieJar trait       │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```

mod codec;
mod config;
mod error;
mod facade;

pub use codec::{Codec, Compressor, DeflateCompressor};
pub use config::{probe_local_store, Backend, BackendConfig};
pub use error::{StorageError, StorageResult};
pub use facade::{Storage, StorageBuilder};
