//! Cache of computed height tiles so edge-shared samples are not recomputed
//! when neighboring chunks generate. Entries are keyed by chunk base and
//! stamped with the worldgen revision; stale revisions evict on lookup.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub base_x: i32,
    pub base_z: i32,
    /// Samples per axis (chunk size + 1, both edges included).
    pub samples: usize,
}

impl TileKey {
    #[inline]
    pub fn new(base_x: i32, base_z: i32, samples: usize) -> Self {
        Self {
            base_x,
            base_z,
            samples,
        }
    }
}

#[derive(Debug)]
pub struct HeightTile {
    key: TileKey,
    pub worldgen_rev: u32,
    heights: Arc<[f32]>,
    pub reuse_count: AtomicU64,
}

impl HeightTile {
    pub fn new(key: TileKey, worldgen_rev: u32, heights: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            key,
            worldgen_rev,
            heights: heights.into(),
            reuse_count: AtomicU64::new(0),
        })
    }

    #[inline]
    pub fn key(&self) -> &TileKey {
        &self.key
    }

    #[inline]
    pub fn heights(&self) -> &Arc<[f32]> {
        &self.heights
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HeightTileCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

pub struct HeightTileCache {
    entries: RwLock<HashMap<TileKey, Arc<HeightTile>>>,
    order: Mutex<VecDeque<TileKey>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl HeightTileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &TileKey, expected_rev: u32) -> Option<Arc<HeightTile>> {
        if let Some(tile) = self.lookup(key) {
            if tile.worldgen_rev == expected_rev {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tile.reuse_count.fetch_add(1, Ordering::Relaxed);
                self.touch_key(key);
                return Some(tile);
            }
            self.remove_entry(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, tile: Arc<HeightTile>) {
        let key = *tile.key();
        {
            let mut entries = self.entries.write().unwrap();
            entries.insert(key, tile);
        }
        self.remove_from_order(&key);
        {
            let mut order = self.order.lock().unwrap();
            order.push_back(key);
        }
        self.enforce_capacity();
    }

    pub fn snapshot(&self) -> HeightTileCacheStats {
        HeightTileCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.entries.read().map(|m| m.len()).unwrap_or(0),
        }
    }

    pub fn invalidate_all(&self) {
        let evicted = {
            let mut entries = self.entries.write().unwrap();
            let len = entries.len() as u64;
            entries.clear();
            len
        };
        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }
        let mut order = self.order.lock().unwrap();
        order.clear();
    }

    fn lookup(&self, key: &TileKey) -> Option<Arc<HeightTile>> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn remove_entry(&self, key: &TileKey) {
        let removed = {
            let mut entries = self.entries.write().unwrap();
            entries.remove(key)
        };
        if removed.is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.remove_from_order(key);
    }

    fn touch_key(&self, key: &TileKey) {
        let mut order = self.order.lock().unwrap();
        if let Some(pos) = order.iter().position(|k| k == key) {
            if let Some(entry) = order.remove(pos) {
                order.push_back(entry);
            }
        }
    }

    fn remove_from_order(&self, key: &TileKey) {
        let mut order = self.order.lock().unwrap();
        if let Some(pos) = order.iter().position(|k| k == key) {
            order.remove(pos);
        }
    }

    fn enforce_capacity(&self) {
        let mut victims: Vec<TileKey> = Vec::new();
        {
            let mut order = self.order.lock().unwrap();
            while order.len() > self.capacity {
                if let Some(old) = order.pop_front() {
                    victims.push(old);
                }
            }
        }
        if victims.is_empty() {
            return;
        }
        let mut entries = self.entries.write().unwrap();
        for key in victims {
            if entries.remove(&key).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
