//! 提取结果缓存
//!
//! 以视频路径为键，假定视频在进程生命周期内不变，
//! 因此只在未命中时扫描一次。失效需显式调用。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct ExtractionCache {
    entries: HashMap<PathBuf, Vec<f64>>,
    stats: CacheStats,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命中直接返回，未命中时调用 `scan` 并保存结果
    pub fn get_or_scan<F>(&mut self, path: &Path, scan: F) -> &[f64]
    where
        F: FnOnce(&Path) -> Vec<f64>,
    {
        if self.entries.contains_key(path) {
            self.stats.hits += 1;
            debug!("💾 Extraction cache hit: {}", path.display());
        } else {
            self.stats.misses += 1;
            let values = scan(path);
            info!(
                "💾 Cached {} multipliers for {}",
                values.len(),
                path.display()
            );
            self.entries.insert(path.to_path_buf(), values);
        }

        self.entries
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, path: &Path) -> Option<&[f64]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
