//! Storage - The Unified Key-Value Facade
//!
//! TigerStyle: one API regardless of which substrate is actually there.
//!
//! # Control flow
//!
//! ```text
//! caller → expiry wrapper (optional) → operations → codec → substrate
//! ```
//!
//! Operations are exposed as `async fn` for contract uniformity between
//! backends; the substrate calls themselves are synchronous and merely
//! wrapped. Backend selection and codec bindings live in a
//! [`BackendConfig`] owned by the facade instance, resolved by
//! initialization and treated as read-only afterwards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::codec::Compressor;
use super::config::{Backend, BackendConfig};
use super::error::{StorageError, StorageResult};
use crate::constants::{
    cookie_dead, cookie_undead, COOKIE_EXPIRES_FORMAT, COOKIE_PATH, STORAGE_PREFIX,
};
use crate::dst::{Clock, SystemClock};
use crate::substrate::{parse_pairs, CookieJar, LocalStore};

// =============================================================================
// Expiring entry
// =============================================================================

/// Wire shape of a TTL-wrapped value: `{"expireAt": <epoch ms>, "value": ...}`.
#[derive(Debug, Serialize, Deserialize)]
struct ExpiringEntry {
    #[serde(rename = "expireAt")]
    expire_at_ms: i64,
    value: Value,
}

// =============================================================================
// Key validation
// =============================================================================

// Any non-empty key is valid; the substrate quota is the only bound.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_argument("key cannot be empty"));
    }
    Ok(())
}

/// Parse decoded text as JSON, degrading to an opaque string.
///
/// Malformed stored content must never fail a read.
fn try_parse(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Storage`] with optional clock and compressor.
pub struct StorageBuilder {
    local: Arc<dyn LocalStore>,
    jar: Arc<dyn CookieJar>,
    clock: Option<Arc<dyn Clock>>,
    compressor: Option<Arc<dyn Compressor>>,
}

impl StorageBuilder {
    /// Inject a clock (tests inject `SimClock`).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Inject the optional compression collaborator.
    #[must_use]
    pub fn with_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Probe the substrates, bind codecs, and build the facade.
    #[must_use]
    pub fn initialize(self) -> Storage {
        let config = BackendConfig::resolve(self.local.as_ref(), self.compressor.as_ref());
        Storage {
            local: self.local,
            jar: self.jar,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            compressor: self.compressor,
            config,
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

/// The key-value persistence facade.
///
/// Presents set/get/remove/keys/removeAll plus the TTL wrapper
/// uniformly over whichever substrate the probe selected. Entries are
/// owned by the substrate; this type only mediates access.
pub struct Storage {
    local: Arc<dyn LocalStore>,
    jar: Arc<dyn CookieJar>,
    clock: Arc<dyn Clock>,
    compressor: Option<Arc<dyn Compressor>>,
    config: BackendConfig,
}

impl Storage {
    /// Start building a facade over the given substrates.
    #[must_use]
    pub fn builder(local: Arc<dyn LocalStore>, jar: Arc<dyn CookieJar>) -> StorageBuilder {
        StorageBuilder {
            local,
            jar,
            clock: None,
            compressor: None,
        }
    }

    /// Build with defaults: system clock, no compression.
    #[must_use]
    pub fn initialize(local: Arc<dyn LocalStore>, jar: Arc<dyn CookieJar>) -> Self {
        Self::builder(local, jar).initialize()
    }

    /// Re-run the probe and codec binding, fully replacing the prior
    /// selection. Must not race in-flight operations.
    pub fn reinitialize(&mut self) {
        self.config = BackendConfig::resolve(self.local.as_ref(), self.compressor.as_ref());
    }

    /// The active session configuration.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    // =========================================================================
    // Key-value operations
    // =========================================================================

    /// List all logical keys, prefix stripped, substrate order.
    pub async fn keys(&self) -> StorageResult<Vec<String>> {
        let keys = match self.config.backend() {
            Backend::LocalStore => self
                .local
                .keys()
                .into_iter()
                .filter_map(|key| key.strip_prefix(STORAGE_PREFIX).map(str::to_string))
                .collect(),
            Backend::CookieStore => parse_pairs(&self.jar.read())
                .into_keys()
                .filter_map(|name| name.strip_prefix(STORAGE_PREFIX).map(str::to_string))
                .collect(),
        };
        Ok(keys)
    }

    /// Store a value under a key, overwriting unconditionally.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        validate_key(key)?;
        let serialized = serde_json::to_string(value)
            .map_err(|e| StorageError::internal(format!("failed to serialize value: {e}")))?;
        self.base_set(key, &serialized, None)
    }

    /// Read the value stored under a key.
    ///
    /// Absent keys resolve to `None`. Stored content that no longer
    /// parses as JSON resolves to the decoded raw string.
    pub async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        validate_key(key)?;
        let prefixed = format!("{STORAGE_PREFIX}{key}");

        let raw = match self.config.backend() {
            Backend::LocalStore => self.local.get_item(&prefixed),
            Backend::CookieStore => parse_pairs(&self.jar.read()).get(&prefixed).cloned(),
        };

        match raw {
            None => Ok(None),
            Some(raw) => {
                let decoded = self.config.active_codec().decode(&raw);
                Ok(Some(try_parse(decoded)))
            }
        }
    }

    /// Delete a key. Removing an absent key succeeds.
    ///
    /// On the cookie backend the deleting write (dead-dated expiry) is
    /// only issued when the key is currently present, so keys that
    /// never existed do not leave spurious jar entries behind.
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let prefixed = format!("{STORAGE_PREFIX}{key}");
        debug!(key, backend = %self.config.backend(), "remove");

        match self.config.backend() {
            Backend::LocalStore => {
                self.local.remove_item(&prefixed);
                Ok(())
            }
            Backend::CookieStore => {
                if parse_pairs(&self.jar.read()).contains_key(&prefixed) {
                    let expires = cookie_dead().format(COOKIE_EXPIRES_FORMAT);
                    self.jar
                        .write(&format!("{prefixed}=; expires={expires}; path={COOKIE_PATH}"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Remove every entry under the namespace prefix.
    ///
    /// One remove per key, fanned out independently; the first failure
    /// is reported only after every removal has settled.
    pub async fn remove_all(&self) -> StorageResult<()> {
        // TODO: batch into one substrate operation once the substrate
        // contracts grow a bulk delete.
        let keys = self.keys().await?;
        debug!(count = keys.len(), "remove_all");

        let settled = join_all(keys.iter().map(|key| self.remove(key))).await;
        settled.into_iter().collect()
    }

    // =========================================================================
    // Expiry wrapper
    // =========================================================================

    /// Store a value together with an absolute expiration timestamp.
    ///
    /// The wrapped entry also rides the backend's native expiry channel
    /// where one exists (cookie backend only; the local store relies
    /// entirely on lazy deletion).
    pub async fn set_with_expire<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expire_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let entry = ExpiringEntry {
            expire_at_ms: expire_at.timestamp_millis(),
            value: serde_json::to_value(value)
                .map_err(|e| StorageError::internal(format!("failed to serialize value: {e}")))?,
        };
        let serialized = serde_json::to_string(&entry)
            .map_err(|e| StorageError::internal(format!("failed to serialize entry: {e}")))?;

        self.base_set(key, &serialized, Some(expire_at))
    }

    /// Read a TTL-wrapped value, purging it if expired.
    ///
    /// Lazy expiry: an entry past its timestamp is deleted here, on
    /// read, and reported absent. A stored value that is not an expiry
    /// wrapper also reads as absent.
    pub async fn get_with_expire(&self, key: &str) -> StorageResult<Option<Value>> {
        let Some(stored) = self.get(key).await? else {
            return Ok(None);
        };

        let Ok(entry) = serde_json::from_value::<ExpiringEntry>(stored) else {
            return Ok(None);
        };

        let now_ms = i64::try_from(self.clock.now_ms()).unwrap_or(i64::MAX);
        if now_ms > entry.expire_at_ms {
            debug!(key, "entry expired, purging on read");
            self.remove(key).await?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn base_set(
        &self,
        key: &str,
        serialized: &str,
        expire: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let prefixed = format!("{STORAGE_PREFIX}{key}");
        debug_assert!(prefixed.starts_with(STORAGE_PREFIX));

        let encoded = self.config.active_codec().encode(serialized);
        debug!(key, backend = %self.config.backend(), bytes = encoded.len(), "set");

        match self.config.backend() {
            Backend::LocalStore => self.local.set_item(&prefixed, &encoded),
            Backend::CookieStore => {
                let expires = expire
                    .unwrap_or_else(cookie_undead)
                    .format(COOKIE_EXPIRES_FORMAT);
                self.jar
                    .write(&format!("{prefixed}={encoded}; expires={expires}; path={COOKIE_PATH}"))
            }
        }
    }
}
