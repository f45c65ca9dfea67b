//! Per-search result caches keyed by position fingerprint.
//!
//! Entries are value snapshots: every store copies its ordered move list so
//! no two slots ever share a buffer. Each entry also records the position
//! tag it was computed for; a probe whose live tag disagrees is a fingerprint
//! collision and the entry is dropped instead of trusted.

use std::collections::HashMap;

use tracing::warn;

use crate::game_state::isolation_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Stored score is a lower bound (the node failed high).
    Lower,
    /// Stored score is an upper bound (the node failed low).
    Upper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub tag: PositionTag,
    /// Remaining depth the entry was searched to.
    pub depth: u8,
    pub score: f64,
    pub bound: Bound,
    /// Legal moves, best first for the player to move.
    pub moves: Vec<Square>,
}

impl CacheEntry {
    #[inline]
    pub fn best_move(&self) -> Option<Square> {
        self.moves.first().copied()
    }

    /// Whether the stored score settles a node searched to `depth` with
    /// window `(alpha, beta)`.
    pub fn usable_score(&self, depth: u8, alpha: f64, beta: f64) -> Option<f64> {
        if self.depth < depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    /// Entries discarded because their tag did not match the live board.
    pub stale: u64,
}

impl CacheStats {
    pub fn merged(self, other: CacheStats) -> CacheStats {
        CacheStats {
            probes: self.probes + other.probes,
            hits: self.hits + other.hits,
            stores: self.stores + other.stores,
            stale: self.stale + other.stale,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchCache {
    entries: HashMap<u64, CacheEntry>,
    stats: CacheStats,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Look up `key`, discarding the entry if it was stored for a different
    /// position.
    pub fn probe(&mut self, key: u64, tag: &PositionTag) -> Option<&CacheEntry> {
        self.stats.probes += 1;
        let collided = match self.entries.get(&key) {
            None => return None,
            Some(entry) => entry.tag != *tag,
        };
        if collided {
            self.stats.stale += 1;
            warn!(key, ?tag, "discarding cache entry stored for a different position");
            self.entries.remove(&key);
            return None;
        }
        self.stats.hits += 1;
        self.entries.get(&key)
    }

    /// Deeper results replace shallower ones; equal depth overwrites.
    pub fn store(&mut self, key: u64, entry: CacheEntry) {
        self.stats.stores += 1;
        match self.entries.get(&key) {
            Some(existing) if existing.tag == entry.tag && existing.depth > entry.depth => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }
}

/// The two caches one search owns: `own` for the root player's layers,
/// `opp` for the opponent's.
#[derive(Debug, Clone, Default)]
pub struct SearchCaches {
    pub own: SearchCache,
    pub opp: SearchCache,
}

impl SearchCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.own.clear();
        self.opp.clear();
    }

    #[inline]
    pub fn layer(&mut self, root_to_move: bool) -> &mut SearchCache {
        if root_to_move {
            &mut self.own
        } else {
            &mut self.opp
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.own.stats().merged(self.opp.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(one: (u8, u8), two: (u8, u8), active: PlayerId) -> PositionTag {
        PositionTag {
            player_one: Some(one.into()),
            player_two: Some(two.into()),
            active,
        }
    }

    fn entry(tag: PositionTag, depth: u8, score: f64, bound: Bound) -> CacheEntry {
        CacheEntry {
            tag,
            depth,
            score,
            bound,
            moves: vec![Square::new(1, 2), Square::new(2, 1)],
        }
    }

    #[test]
    fn store_and_probe_round_trip() {
        let mut cache = SearchCache::new();
        let t = tag((0, 0), (3, 3), PlayerId::One);
        cache.store(42, entry(t, 3, 1.5, Bound::Exact));
        let got = cache.probe(42, &t).expect("entry should exist");
        assert_eq!(got.score, 1.5);
        assert_eq!(got.best_move(), Some(Square::new(1, 2)));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn mismatched_tag_is_discarded_as_stale() {
        let mut cache = SearchCache::new();
        let stored = tag((0, 0), (3, 3), PlayerId::One);
        let live = tag((0, 0), (3, 3), PlayerId::Two);
        cache.store(7, entry(stored, 2, 0.0, Bound::Exact));

        assert!(cache.probe(7, &live).is_none());
        assert_eq!(cache.stats().stale, 1);
        assert!(cache.is_empty());
        assert!(cache.probe(7, &stored).is_none());
    }

    #[test]
    fn shallower_store_does_not_replace_deeper_entry() {
        let mut cache = SearchCache::new();
        let t = tag((1, 1), (4, 4), PlayerId::One);
        cache.store(9, entry(t, 4, 2.0, Bound::Exact));
        cache.store(9, entry(t, 1, -5.0, Bound::Exact));
        assert_eq!(cache.probe(9, &t).map(|e| e.score), Some(2.0));
        cache.store(9, entry(t, 4, 3.0, Bound::Lower));
        assert_eq!(cache.probe(9, &t).map(|e| e.score), Some(3.0));
    }

    #[test]
    fn bounds_gate_score_reuse() {
        let t = tag((0, 0), (3, 3), PlayerId::One);
        assert_eq!(entry(t, 3, 1.0, Bound::Exact).usable_score(3, -9.0, 9.0), Some(1.0));
        assert_eq!(entry(t, 2, 1.0, Bound::Exact).usable_score(3, -9.0, 9.0), None);
        assert_eq!(entry(t, 3, 5.0, Bound::Lower).usable_score(3, 0.0, 4.0), Some(5.0));
        assert_eq!(entry(t, 3, 5.0, Bound::Lower).usable_score(3, 0.0, 6.0), None);
        assert_eq!(entry(t, 3, -1.0, Bound::Upper).usable_score(3, 0.0, 6.0), Some(-1.0));
        assert_eq!(entry(t, 3, 1.0, Bound::Upper).usable_score(3, 0.0, 6.0), None);
    }

    #[test]
    fn caches_clear_together() {
        let mut caches = SearchCaches::new();
        let t = tag((0, 0), (3, 3), PlayerId::One);
        caches.layer(true).store(1, entry(t, 1, 0.0, Bound::Exact));
        caches.layer(false).store(2, entry(t, 1, 0.0, Bound::Exact));
        assert_eq!(caches.stats().stores, 2);
        caches.clear();
        assert!(caches.own.is_empty() && caches.opp.is_empty());
        assert_eq!(caches.stats(), CacheStats::default());
    }
}
