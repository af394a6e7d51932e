//! Per-run memoization of history lookups
//!
//! A [`ResolutionCache`] lives for exactly one run and is passed explicitly to
//! the planner, so separate runs in the same process never share entries.
//!
//! Each key owns its own slot. The first caller to reach an empty slot holds
//! the slot lock while it resolves; concurrent callers for the same key wait
//! on that lock and then read the stored value, so every key is resolved at
//! most once and all callers observe the same result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::{Error, Result};

/// Outcome of a history lookup for one referenced path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "revision", rename_all = "snake_case")]
pub enum Resolution {
    /// Newest revision that touched the path.
    Resolved(String),
    /// The path has no history.
    Unresolved,
}

impl Resolution {
    /// The resolved revision, if any.
    pub fn revision(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(revision) => Some(revision.as_str()),
            Resolution::Unresolved => None,
        }
    }
}

type Slot = Arc<Mutex<Option<Resolution>>>;

/// Write-once-per-key table of path resolutions.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ResolutionCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the resolution for `path`, or compute and store it if not present.
    ///
    /// An error from `resolve` is returned as-is and leaves the slot empty.
    pub fn get_or_resolve<F>(&self, path: &str, resolve: F) -> Result<Resolution>
    where
        F: FnOnce() -> Result<Resolution>,
    {
        let slot = {
            let mut slots = self.slots.lock().map_err(|_| Error::LockPoisoned {
                context: "resolution cache".to_string(),
            })?;
            Arc::clone(slots.entry(path.to_string()).or_default())
        };

        let mut value = slot.lock().map_err(|_| Error::LockPoisoned {
            context: format!("resolution slot for '{}'", path),
        })?;
        if let Some(cached) = value.as_ref() {
            return Ok(cached.clone());
        }

        let resolved = resolve()?;
        *value = Some(resolved.clone());
        Ok(resolved)
    }

    /// Get a stored resolution without computing
    #[cfg(test)]
    pub fn get(&self, path: &str) -> Result<Option<Resolution>> {
        let slot = {
            let slots = self.slots.lock().map_err(|_| Error::LockPoisoned {
                context: "resolution cache".to_string(),
            })?;
            match slots.get(path) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(None),
            }
        };
        let value = slot.lock().map_err(|_| Error::LockPoisoned {
            context: format!("resolution slot for '{}'", path),
        })?;
        Ok(value.clone())
    }

    /// Number of paths with a stored resolution
    #[cfg(test)]
    pub fn len(&self) -> Result<usize> {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().map_err(|_| Error::LockPoisoned {
                context: "resolution cache".to_string(),
            })?;
            slots.values().cloned().collect()
        };
        let mut filled = 0;
        for slot in slots {
            let value = slot.lock().map_err(|_| Error::LockPoisoned {
                context: "resolution slot".to_string(),
            })?;
            if value.is_some() {
                filled += 1;
            }
        }
        Ok(filled)
    }

    /// Check if no path has been resolved yet
    #[cfg(test)]
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const REV: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_cache_new_is_empty() {
        let cache = ResolutionCache::new();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.get("get-nproc").unwrap(), None);
    }

    #[test]
    fn test_get_or_resolve_computes_once() {
        let cache = ResolutionCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_resolve("get-nproc", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Resolution::Resolved(REV.to_string()))
                })
                .unwrap();
            assert_eq!(result.revision(), Some(REV));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_unresolved_is_cached_too() {
        let cache = ResolutionCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let result = cache
                .get_or_resolve("missing", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Resolution::Unresolved)
                })
                .unwrap();
            assert_eq!(result, Resolution::Unresolved);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_leaves_slot_empty() {
        let cache = ResolutionCache::new();
        let result = cache.get_or_resolve("x", || {
            Err(Error::HistoryUnavailable {
                path: "x".to_string(),
                command: "git log".to_string(),
                stderr: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(cache.get("x").unwrap(), None);
        assert!(cache.is_empty().unwrap());

        let retried = cache
            .get_or_resolve("x", || Ok(Resolution::Unresolved))
            .unwrap();
        assert_eq!(retried, Resolution::Unresolved);
    }

    #[test]
    fn test_concurrent_callers_share_one_resolution() {
        let cache = ResolutionCache::new();
        let calls = AtomicUsize::new(0);

        thread::scope(|scope| {
            for i in 0..8 {
                let cache = &cache;
                let calls = &calls;
                scope.spawn(move || {
                    let result = cache
                        .get_or_resolve("shared", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(10));
                            Ok(Resolution::Resolved(format!("{:040x}", i)))
                        })
                        .unwrap();
                    assert!(result.revision().is_some());
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_separate_caches_do_not_share_entries() {
        let first = ResolutionCache::new();
        first
            .get_or_resolve("a", || Ok(Resolution::Resolved(REV.to_string())))
            .unwrap();
        let second = ResolutionCache::new();
        assert_eq!(second.get("a").unwrap(), None);
    }

    #[test]
    fn test_resolution_serializes_with_status() {
        let json = serde_json::to_string(&Resolution::Resolved(REV.to_string())).unwrap();
        assert!(json.contains("\"status\":\"resolved\""));
        let json = serde_json::to_string(&Resolution::Unresolved).unwrap();
        assert_eq!(json, "{\"status\":\"unresolved\"}");
    }
}
