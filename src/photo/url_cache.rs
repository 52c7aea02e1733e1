use std::time::{Duration, Instant};

use moka::future::Cache;

use super::storage::{PhotoStore, is_external};
use crate::error::AppError;

/// Margin of validity a cached URL must still have to be handed out again.
pub const REUSE_MARGIN: Duration = Duration::from_secs(10 * 60);

const MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    url: String,
    expires_at: Instant,
}

/// Process-wide cache of signed display URLs keyed by stored photo path.
#[derive(Clone)]
pub struct SignedUrlCache {
    entries: Cache<String, CachedUrl>,
    record_lifetime: Duration,
    reuse_margin: Duration,
}

impl SignedUrlCache {
    pub fn new(record_lifetime: Duration, reuse_margin: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(record_lifetime.max(Duration::from_secs(1)))
                .build(),
            record_lifetime,
            reuse_margin,
        }
    }

    /// Records live ten minutes less than the URLs they hold.
    pub fn for_url_ttl(url_ttl: Duration) -> Self {
        Self::new(url_ttl.saturating_sub(REUSE_MARGIN), REUSE_MARGIN)
    }

    pub async fn resolve_with<F>(&self, path: &str, sign: F) -> Result<String, AppError>
    where
        F: FnOnce(&str) -> Result<String, AppError>,
    {
        if is_external(path) {
            return Ok(path.to_string());
        }

        let now = Instant::now();
        if let Some(cached) = self.entries.get(path).await {
            if cached.expires_at.saturating_duration_since(now) > self.reuse_margin {
                return Ok(cached.url);
            }
        }

        let url = sign(path)?;
        self.entries
            .insert(
                path.to_string(),
                CachedUrl {
                    url: url.clone(),
                    expires_at: now + self.record_lifetime,
                },
            )
            .await;
        Ok(url)
    }

    /// Display URL for a stored path, or `None` when signing fails and the
    /// caller should fall back to the placeholder.
    pub async fn resolve(&self, path: &str, store: &PhotoStore) -> Option<String> {
        match self.resolve_with(path, |p| store.signed_url(p)).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Could not sign photo URL for {}: {}", path, e);
                None
            }
        }
    }

    pub async fn invalidate(&self, path: &str) {
        self.entries.invalidate(path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_signer(counter: &AtomicUsize) -> impl FnOnce(&str) -> Result<String, AppError> + '_ {
        move |path| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://signed/{}?v={}", path, n))
        }
    }

    #[tokio::test]
    async fn cached_url_is_reused_while_fresh() {
        let cache = SignedUrlCache::for_url_ttl(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        let first = cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();
        let second = cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn nearly_expired_records_are_re_signed() {
        // Record lifetime inside the reuse margin: every lookup signs again.
        let cache = SignedUrlCache::new(Duration::from_secs(60), REUSE_MARGIN);
        let calls = AtomicUsize::new(0);

        let first = cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();
        let second = cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_signature() {
        let cache = SignedUrlCache::for_url_ttl(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();
        cache.invalidate("members/a.jpg").await;
        cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn absolute_urls_bypass_signing() {
        let cache = SignedUrlCache::for_url_ttl(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        let url = cache
            .resolve_with("https://cdn.example.com/a.jpg", counting_signer(&calls))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/a.jpg");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signing_failures_are_not_cached() {
        let cache = SignedUrlCache::for_url_ttl(Duration::from_secs(3600));
        let result = cache
            .resolve_with("members/a.jpg", |_| Err(AppError::internal_server_error()))
            .await;
        assert!(result.is_err());

        let calls = AtomicUsize::new(0);
        cache.resolve_with("members/a.jpg", counting_signer(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
