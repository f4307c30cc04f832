//! BackendConfig - Probe-Driven Backend Selection
//!
//! TigerStyle: selection is a pure decision over explicit probe results,
//! not exception control flow, and the outcome is a value the facade
//! owns rather than module-level mutable state.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use super::codec::{Codec, Compressor};
use crate::constants::{PROBE_KEY_SPAN, STORAGE_PREFIX};
use crate::substrate::LocalStore;

// =============================================================================
// Backend
// =============================================================================

/// The substrate a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Capacity-bound key-value substrate.
    LocalStore,
    /// String-concatenated cookie jar fallback.
    CookieStore,
}

impl Backend {
    /// Get string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalStore => "local_store",
            Self::CookieStore => "cookie_store",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Probe
// =============================================================================

/// Zero-risk capability probe: write-then-delete a randomized
/// disposable key against the local store.
///
/// Any write failure (capability absent, quota exceeded, access denied)
/// reads as "unavailable". The disposable key never survives the probe.
#[must_use]
pub fn probe_local_store(store: &dyn LocalStore) -> bool {
    let suffix: u32 = rand::thread_rng().gen_range(0..PROBE_KEY_SPAN);
    let probe_key = format!("{STORAGE_PREFIX}__{suffix}");

    match store.set_item(&probe_key, "") {
        Ok(()) => {
            store.remove_item(&probe_key);
            true
        }
        Err(error) => {
            debug!(%error, "local store probe write failed");
            false
        }
    }
}

// =============================================================================
// BackendConfig
// =============================================================================

/// Immutable session configuration: the selected backend and the codec
/// bound to each backend type.
///
/// Resolved once per initialization; re-resolving fully replaces the
/// prior selection.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    backend: Backend,
    local_codec: Codec,
    cookie_codec: Codec,
}

impl BackendConfig {
    /// Probe the local store and bind codecs.
    ///
    /// Fallback to the cookie backend is silent and total; no error
    /// escapes this step. With a compressor present, the cookie backend
    /// gets the URL-safe variant and the local store the plain-text
    /// variant; without one, both get the identity codec.
    #[must_use]
    pub fn resolve(local: &dyn LocalStore, compressor: Option<&Arc<dyn Compressor>>) -> Self {
        let backend = if probe_local_store(local) {
            Backend::LocalStore
        } else {
            warn!("local store unavailable, falling back to cookie backend");
            Backend::CookieStore
        };
        debug!(backend = %backend, compressed = compressor.is_some(), "backend selected");

        let (local_codec, cookie_codec) = match compressor {
            Some(compressor) => (
                Codec::CompressedText(Arc::clone(compressor)),
                Codec::CompressedUrlSafe(Arc::clone(compressor)),
            ),
            None => (Codec::Identity, Codec::Identity),
        };

        Self {
            backend,
            local_codec,
            cookie_codec,
        }
    }

    /// The selected backend.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The codec bound to the selected backend.
    #[must_use]
    pub fn active_codec(&self) -> &Codec {
        match self.backend {
            Backend::LocalStore => &self.local_codec,
            Backend::CookieStore => &self.cookie_codec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::DeflateCompressor;
    use crate::substrate::MemoryLocalStore;

    #[test]
    fn test_probe_succeeds_and_cleans_up() {
        let store = MemoryLocalStore::new();

        assert!(probe_local_store(&store));
        assert!(store.keys().is_empty(), "disposable probe key must not survive");
    }

    #[test]
    fn test_probe_fails_on_full_store() {
        let store = MemoryLocalStore::with_capacity(0);
        assert!(!probe_local_store(&store));
    }

    #[test]
    fn test_resolve_selects_local_store() {
        let store = MemoryLocalStore::new();

        let config = BackendConfig::resolve(&store, None);

        assert_eq!(config.backend(), Backend::LocalStore);
        assert!(matches!(config.active_codec(), Codec::Identity));
    }

    #[test]
    fn test_resolve_falls_back_silently() {
        let store = MemoryLocalStore::with_capacity(0);

        let config = BackendConfig::resolve(&store, None);

        assert_eq!(config.backend(), Backend::CookieStore);
    }

    #[test]
    fn test_resolve_binds_codec_variants() {
        let compressor: Arc<dyn Compressor> = Arc::new(DeflateCompressor);

        let local = BackendConfig::resolve(&MemoryLocalStore::new(), Some(&compressor));
        assert!(matches!(local.active_codec(), Codec::CompressedText(_)));

        let cookie =
            BackendConfig::resolve(&MemoryLocalStore::with_capacity(0), Some(&compressor));
        assert!(matches!(cookie.active_codec(), Codec::CompressedUrlSafe(_)));
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let store = MemoryLocalStore::new();

        let first = BackendConfig::resolve(&store, None);
        let second = BackendConfig::resolve(&store, None);

        assert_eq!(first.backend(), second.backend());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_backend_as_str() {
        assert_eq!(Backend::LocalStore.as_str(), "local_store");
        assert_eq!(Backend::CookieStore.as_str(), "cookie_store");
    }
}
