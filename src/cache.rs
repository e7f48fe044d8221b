//! TTL-aware LRU cache for resolved IP addresses.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::RwLock;

struct IpCacheEntry {
    ips: Vec<IpAddr>,
    expires_at: Instant,
}

/// Bounded host → IPs cache with per-entry expiry.
///
/// Mimics OS-level DNS caching (mDNSResponder, systemd-resolved) while
/// keeping size and TTL bounds explicit. Already-parsed `IpAddr`s are
/// stored so the hot path skips string parsing entirely. A size of 0
/// disables the cache: every operation becomes a no-op.
pub(crate) struct DnsCache {
    inner: Option<RwLock<LruCache<String, IpCacheEntry>>>,
    min_ttl: Duration,
    max_ttl: Duration,
}

impl DnsCache {
    /// `size` bounds the number of cached hostnames (LRU eviction beyond
    /// that). Response TTLs are clamped into `[min_ttl, max_ttl]`: the
    /// floor keeps near-zero TTLs from thrashing the cache, the ceiling
    /// forces periodic revalidation no matter what the server claims.
    pub(crate) fn new(size: usize, min_ttl: Duration, max_ttl: Duration) -> Self {
        let inner = NonZeroUsize::new(size).map(|size| RwLock::new(LruCache::new(size)));
        Self {
            inner,
            min_ttl,
            max_ttl,
        }
    }

    pub(crate) fn disabled() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Returns the live cached IPs for `host`, or None on miss, expiry, or
    /// a disabled cache. Expired entries are left for LRU eviction rather
    /// than removed eagerly; the expiry check here is what guarantees no
    /// stale data escapes.
    pub(crate) fn get_ips(&self, host: &str) -> Option<Vec<IpAddr>> {
        let inner = self.inner.as_ref()?;
        let cache = inner.read();
        let entry = cache.peek(host)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        // Copy the outer list so callers cannot mutate cached state; the
        // addresses themselves are plain values.
        Some(entry.ips.clone())
    }

    /// Stores `ips` for `host`, expiring after the clamped TTL.
    pub(crate) fn set_ips(&self, host: &str, ips: Vec<IpAddr>, ttl: Duration) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        if ips.is_empty() {
            return;
        }
        // Two-step clamp rather than Ord::clamp: the latter panics when the
        // configured bounds are inverted, and a misconfigured cache should
        // degrade, not crash the first lookup.
        let mut ttl = ttl;
        if ttl < self.min_ttl {
            ttl = self.min_ttl;
        }
        if ttl > self.max_ttl {
            ttl = self.max_ttl;
        }
        let entry = IpCacheEntry {
            ips,
            expires_at: Instant::now() + ttl,
        };
        inner.write().put(host.to_string(), entry);
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn set_then_get_returns_a_copy() {
        let cache = DnsCache::new(4, Duration::from_millis(1), Duration::from_secs(60));
        cache.set_ips("example.com", vec![ip("1.1.1.1"), ip("2.2.2.2")], Duration::from_secs(30));

        let mut got = cache.get_ips("example.com").unwrap();
        assert_eq!(got, vec![ip("1.1.1.1"), ip("2.2.2.2")]);

        // Mutating the returned list must not affect the cached entry.
        got.clear();
        assert_eq!(
            cache.get_ips("example.com").unwrap(),
            vec![ip("1.1.1.1"), ip("2.2.2.2")]
        );
    }

    #[test]
    fn miss_returns_none() {
        let cache = DnsCache::new(4, Duration::ZERO, Duration::from_secs(60));
        assert!(cache.get_ips("example.com").is_none());
    }

    #[test]
    fn entries_expire_by_ttl() {
        // max_ttl clamps the requested TTL down to something testable.
        let cache = DnsCache::new(4, Duration::ZERO, Duration::from_millis(40));
        cache.set_ips("example.com", vec![ip("1.1.1.1")], Duration::from_secs(3600));

        assert!(cache.get_ips("example.com").is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get_ips("example.com").is_none());
    }

    #[test]
    fn short_ttls_are_clamped_up_to_the_floor() {
        let cache = DnsCache::new(4, Duration::from_secs(5), Duration::from_secs(60));
        cache.set_ips("example.com", vec![ip("1.1.1.1")], Duration::ZERO);

        // A zero TTL would have expired instantly; the floor keeps it live.
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get_ips("example.com").is_some());
    }

    #[test]
    fn inverted_bounds_do_not_panic_and_the_ceiling_wins() {
        let cache = DnsCache::new(4, Duration::from_secs(60), Duration::from_millis(40));
        cache.set_ips("example.com", vec![ip("1.1.1.1")], Duration::from_secs(30));

        assert!(cache.get_ips("example.com").is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get_ips("example.com").is_none());
    }

    #[test]
    fn lru_evicts_the_oldest_host_at_capacity() {
        let cache = DnsCache::new(1, Duration::ZERO, Duration::from_secs(60));
        cache.set_ips("first.example.com", vec![ip("1.1.1.1")], Duration::from_secs(30));
        cache.set_ips("second.example.com", vec![ip("2.2.2.2")], Duration::from_secs(30));

        assert!(cache.get_ips("first.example.com").is_none());
        assert!(cache.get_ips("second.example.com").is_some());
    }

    #[test]
    fn disabled_cache_is_a_no_op() {
        let cache = DnsCache::disabled();
        assert!(!cache.is_enabled());
        cache.set_ips("example.com", vec![ip("1.1.1.1")], Duration::from_secs(30));
        assert!(cache.get_ips("example.com").is_none());
    }

    #[test]
    fn empty_ip_lists_are_not_cached() {
        let cache = DnsCache::new(4, Duration::ZERO, Duration::from_secs(60));
        cache.set_ips("example.com", vec![], Duration::from_secs(30));
        assert!(cache.get_ips("example.com").is_none());
    }
}
