use std::collections::HashMap;

use crate::guarded::Guarded;

/// Who is in a private game or chat with whom. Each pairing is stored in
/// both directions, and both directions change under one lock.
#[derive(Debug, Default)]
pub struct PrivateChatIndex {
    partners: Guarded<HashMap<String, String>>,
}

impl PrivateChatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` are paired. A player already paired with
    /// someone else keeps the existing pairing.
    pub async fn pair(&self, a: &str, b: &str) -> bool {
        self.partners
            .write(|map| {
                if map.contains_key(a) || map.contains_key(b) {
                    return false;
                }
                map.insert(a.to_string(), b.to_string());
                map.insert(b.to_string(), a.to_string());
                true
            })
            .await
    }

    pub async fn partner(&self, name: &str) -> Option<String> {
        self.partners.read(|map| map.get(name).cloned()).await
    }

    /// Drop the pairing between `a` and `b`; pairings with others are kept.
    pub async fn unpair(&self, a: &str, b: &str) {
        self.partners
            .write(|map| {
                if map.get(a).is_some_and(|p| p == b) {
                    map.remove(a);
                }
                if map.get(b).is_some_and(|p| p == a) {
                    map.remove(b);
                }
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pair_both_directions() {
        let index = PrivateChatIndex::new();
        assert!(index.pair("alice", "bob").await);
        assert_eq!(index.partner("alice").await.as_deref(), Some("bob"));
        assert_eq!(index.partner("bob").await.as_deref(), Some("alice"));

        index.unpair("alice", "bob").await;
        assert_eq!(index.partner("alice").await, None);
        assert_eq!(index.partner("bob").await, None);
    }

    #[tokio::test]
    async fn test_existing_pairing_is_kept() {
        let index = PrivateChatIndex::new();
        assert!(index.pair("alice", "bob").await);
        assert!(!index.pair("carol", "alice").await);
        assert_eq!(index.partner("carol").await, None);
        assert_eq!(index.partner("alice").await.as_deref(), Some("bob"));

        // Unpairing an unrelated couple leaves alice and bob alone.
        index.unpair("alice", "carol").await;
        assert_eq!(index.partner("alice").await.as_deref(), Some("bob"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_pairings_stay_symmetric() {
        for _ in 0..50 {
            let index = Arc::new(PrivateChatIndex::new());
            let first = tokio::spawn({
                let index = index.clone();
                async move { index.pair("alice", "bob").await }
            });
            let second = tokio::spawn({
                let index = index.clone();
                async move { index.pair("bob", "carol").await }
            });
            let (first, second) = (first.await.unwrap(), second.await.unwrap());
            assert!(first ^ second);

            let bob = index.partner("bob").await.unwrap();
            assert_eq!(index.partner(&bob).await.as_deref(), Some("bob"));
            let loner = if first { "carol" } else { "alice" };
            assert_eq!(index.partner(loner).await, None);
        }
    }
}
