//! Revoked-token blacklist with automatic cleanup

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;

/// Revoked tokens held until their natural expiry
///
/// Logout inserts the token here; the auth extractor rejects any token
/// present in the map. A background task drops entries whose expiry has
/// passed, since those fail signature validation anyway.
pub struct TokenBlacklist {
    revoked: Arc<DashMap<String, i64>>,
}

impl TokenBlacklist {
    #[must_use]
    pub fn new(cleanup_interval_secs: u64) -> Self {
        let revoked: Arc<DashMap<String, i64>> = Arc::new(DashMap::new());

        // Start cleanup task
        let revoked_clone = revoked.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(cleanup_interval_secs)).await;
                Self::cleanup_expired(&revoked_clone);
            }
        });

        Self { revoked }
    }

    /// Revoke a token until the given expiry timestamp
    pub fn revoke(&self, token: String, expires_at: i64) {
        self.revoked.insert(token, expires_at);
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.revoked.contains_key(token)
    }

    #[must_use]
    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    fn cleanup_expired(revoked: &DashMap<String, i64>) {
        let now = Utc::now().timestamp();
        let before = revoked.len();

        revoked.retain(|_, expires_at| *expires_at > now);

        let dropped = before - revoked.len();
        if dropped > 0 {
            tracing::info!("Cleaned up {} expired blacklist entries", dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_and_contains() {
        let blacklist = TokenBlacklist::new(3600);
        let expires_at = Utc::now().timestamp() + 1800;

        blacklist.revoke("token-a".to_string(), expires_at);

        assert!(blacklist.contains("token-a"));
        assert!(!blacklist.contains("token-b"));
        assert_eq!(blacklist.revoked_count(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_expired() {
        let blacklist = TokenBlacklist::new(3600);
        let now = Utc::now().timestamp();

        blacklist.revoke("expired".to_string(), now - 60);
        blacklist.revoke("live".to_string(), now + 3600);

        TokenBlacklist::cleanup_expired(&blacklist.revoked);

        assert!(!blacklist.contains("expired"));
        assert!(blacklist.contains("live"));
    }
}
