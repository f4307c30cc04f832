//! Constants - Named Limits and Sentinels
//!
//! TigerStyle: every magic number gets a name and a unit suffix.

use chrono::{DateTime, TimeZone, Utc};

// =============================================================================
// Namespace
// =============================================================================

/// Prefix prepended to every logical key before it touches a substrate.
///
/// Isolates this system's entries from unrelated keys sharing the same
/// substrate. All read/list/delete paths strip or compare this prefix.
pub const STORAGE_PREFIX: &str = "mmle-storage__";

// =============================================================================
// Local store
// =============================================================================

/// Default byte capacity of the in-memory local store (the conventional
/// 5 MiB local-storage quota).
pub const LOCAL_STORE_CAPACITY_BYTES_DEFAULT: usize = 5 * 1024 * 1024;

// =============================================================================
// Cookie jar
// =============================================================================

/// Path attribute written with every cookie entry.
pub const COOKIE_PATH: &str = "/";

/// Format of the `expires` cookie attribute (RFC-1123 GMT form).
pub const COOKIE_EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Sentinel expiry for entries that must not expire.
///
/// # Panics
/// Never: the sentinel components are statically valid.
#[must_use]
pub fn cookie_undead() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .expect("undead sentinel is a valid timestamp")
}

/// Sentinel expiry used to delete a cookie entry.
///
/// # Panics
/// Never: the sentinel components are statically valid.
#[must_use]
pub fn cookie_dead() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0)
        .single()
        .expect("dead sentinel is a valid timestamp")
}

// =============================================================================
// Probe
// =============================================================================

/// Exclusive upper bound for the random numeric suffix of the disposable
/// probe key.
pub const PROBE_KEY_SPAN: u32 = 10_000_000;

// =============================================================================
// Time
// =============================================================================

/// Milliseconds per second.
pub const TIME_MS_PER_SEC: u64 = 1000;

/// Largest single advance accepted by the simulated clock (one year).
pub const SIM_TIME_ADVANCE_MS_MAX: u64 = 365 * 24 * 60 * 60 * 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_ordered() {
        assert!(cookie_dead() < cookie_undead());
    }

    #[test]
    fn test_undead_expires_rendering() {
        let rendered = cookie_undead().format(COOKIE_EXPIRES_FORMAT).to_string();
        assert!(rendered.ends_with("GMT"));
        assert!(rendered.contains("9999"));
    }

    #[test]
    fn test_dead_is_epoch() {
        assert_eq!(cookie_dead().timestamp_millis(), 0);
    }
}
