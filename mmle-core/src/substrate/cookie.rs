//! CookieJar - String-Concatenated Fallback Substrate
//!
//! TigerStyle: the jar is a parse/serialize boundary, never a shared
//! in-memory structure.
//!
//! The read surface is one concatenated `"name=value; name2=value2"`
//! string; the write surface accepts one attribute-augmented entry
//! (`name=value; expires=<GMT date>; path=/`) and interprets the
//! attributes itself, the way a browser jar would: a past-dated
//! `expires` deletes the entry, a future-dated one stores it, and
//! expired entries never appear on the read surface.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

use crate::constants::{cookie_undead, COOKIE_EXPIRES_FORMAT};
use crate::dst::Clock;
use crate::storage::{StorageError, StorageResult};

/// A cookie jar exposing a single concatenated read/write surface.
pub trait CookieJar: Send + Sync {
    /// The full `"name=value; ..."` concatenation of live entries.
    fn read(&self) -> String;

    /// Accept one `name=value[; expires=...][; path=...]` write.
    fn write(&self, set_str: &str) -> StorageResult<()>;
}

/// Split a jar read surface into a transient name → raw-value mapping.
///
/// Built fresh on every lookup; values keep any `=` past the first one.
#[must_use]
pub fn parse_pairs(jar: &str) -> HashMap<String, String> {
    if jar.is_empty() {
        return HashMap::new();
    }

    jar.split("; ")
        .filter_map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
        })
        .collect()
}

// =============================================================================
// MemoryCookieJar
// =============================================================================

struct CookieRecord {
    name: String,
    value: String,
    expires_at_ms: u64,
}

/// In-memory browser-jar emulation.
///
/// Holds entries in insertion order and filters natively-expired ones
/// out of every read, using the injected clock.
pub struct MemoryCookieJar {
    entries: RwLock<Vec<CookieRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCookieJar {
    /// Create an empty jar observing the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Number of physically stored entries, expired ones included.
    #[must_use]
    pub fn stored_len(&self) -> usize {
        self.entries.read().expect("cookie jar lock poisoned").len()
    }
}

impl CookieJar for MemoryCookieJar {
    fn read(&self) -> String {
        let now_ms = self.clock.now_ms();
        let entries = self.entries.read().expect("cookie jar lock poisoned");

        entries
            .iter()
            .filter(|record| record.expires_at_ms > now_ms)
            .map(|record| format!("{}={}", record.name, record.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write(&self, set_str: &str) -> StorageResult<()> {
        let mut segments = set_str.split("; ");

        let entry = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| StorageError::write("empty cookie write"))?;
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| StorageError::write(format!("malformed cookie entry: {entry}")))?;

        // Attributes after the entry itself. Unknown attributes and an
        // unparseable expires date are ignored, like a browser would;
        // a missing expires makes the entry effectively immortal.
        let mut expires_at_ms =
            u64::try_from(cookie_undead().timestamp_millis()).unwrap_or(u64::MAX);
        for attribute in segments {
            if let Some((attr_name, attr_value)) = attribute.split_once('=') {
                if attr_name.eq_ignore_ascii_case("expires") {
                    if let Ok(parsed) =
                        NaiveDateTime::parse_from_str(attr_value, COOKIE_EXPIRES_FORMAT)
                    {
                        expires_at_ms =
                            u64::try_from(parsed.and_utc().timestamp_millis()).unwrap_or(0);
                    }
                }
            }
        }

        let mut entries = self.entries.write().expect("cookie jar lock poisoned");

        if expires_at_ms <= self.clock.now_ms() {
            entries.retain(|record| record.name != name);
            return Ok(());
        }

        if let Some(record) = entries.iter_mut().find(|record| record.name == name) {
            record.value = value.to_string();
            record.expires_at_ms = expires_at_ms;
        } else {
            entries.push(CookieRecord {
                name: name.to_string(),
                value: value.to_string(),
                expires_at_ms,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::SimClock;

    fn jar_with_clock() -> (MemoryCookieJar, Arc<SimClock>) {
        let clock = Arc::new(SimClock::new());
        (MemoryCookieJar::new(clock.clone()), clock)
    }

    #[test]
    fn test_write_then_read() {
        let (jar, _clock) = jar_with_clock();

        jar.write("a=1").unwrap();
        jar.write("b=2").unwrap();

        assert_eq!(jar.read(), "a=1; b=2");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let (jar, _clock) = jar_with_clock();

        jar.write("a=1").unwrap();
        jar.write("b=2").unwrap();
        jar.write("a=3").unwrap();

        assert_eq!(jar.read(), "a=3; b=2");
    }

    #[test]
    fn test_past_expires_deletes() {
        let (jar, clock) = jar_with_clock();
        clock.advance_ms(10_000);

        jar.write("a=1").unwrap();
        jar.write("a=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/").unwrap();

        assert_eq!(jar.read(), "");
        assert_eq!(jar.stored_len(), 0);
    }

    #[test]
    fn test_past_expires_for_absent_name_writes_nothing() {
        let (jar, clock) = jar_with_clock();
        clock.advance_ms(10_000);

        jar.write("ghost=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/")
            .unwrap();

        assert_eq!(jar.stored_len(), 0);
    }

    #[test]
    fn test_native_expiry_filters_read() {
        let (jar, clock) = jar_with_clock();

        // Expires 5 seconds past the epoch.
        jar.write("a=1; expires=Thu, 01 Jan 1970 00:00:05 GMT; path=/")
            .unwrap();
        assert_eq!(jar.read(), "a=1");

        clock.advance_ms(6_000);
        assert_eq!(jar.read(), "");
    }

    #[test]
    fn test_far_future_expires_persists() {
        let (jar, clock) = jar_with_clock();

        jar.write("a=1; expires=Fri, 31 Dec 9999 23:59:59 GMT; path=/")
            .unwrap();

        clock.advance_ms(1_000_000);
        assert_eq!(jar.read(), "a=1");
    }

    #[test]
    fn test_malformed_write_rejected() {
        let (jar, _clock) = jar_with_clock();
        assert!(jar.write("no-equals-sign").is_err());
        assert!(jar.write("").is_err());
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs("a=1; b=2");
        assert_eq!(pairs.get("a"), Some(&"1".to_string()));
        assert_eq!(pairs.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_pairs_empty() {
        assert!(parse_pairs("").is_empty());
    }

    #[test]
    fn test_parse_pairs_value_keeps_later_equals() {
        let pairs = parse_pairs("a=b=c");
        assert_eq!(pairs.get("a"), Some(&"b=c".to_string()));
    }
}
