// src/store.rs
//! Dedup store: remembers which identifiers each source has already handed
//! out, across runs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKey {
    GithubRepos,
    LatentSpaceLinks,
}

impl SourceKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::GithubRepos => "github_repos",
            SourceKey::LatentSpaceLinks => "latent_space_links",
        }
    }
}

#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Previously processed identifiers; an unknown key yields an empty list.
    async fn get(&self, key: SourceKey) -> Result<Vec<String>>;
    /// Replaces the stored list for `key`.
    async fn put(&self, key: SourceKey, items: Vec<String>) -> Result<()>;
}

/// One lock per key, held across the whole read-merge-write in [`remember`].
static REMEMBER_LOCKS: Lazy<HashMap<SourceKey, Mutex<()>>> = Lazy::new(|| {
    [SourceKey::GithubRepos, SourceKey::LatentSpaceLinks]
        .into_iter()
        .map(|k| (k, Mutex::new(())))
        .collect()
});

/// Persists `previous ∪ new` under `key` and returns the merged set.
/// The stored list never shrinks, also when runs overlap: calls for the
/// same key are serialized within the process.
pub async fn remember(
    store: &dyn DedupStore,
    key: SourceKey,
    new_items: &[String],
) -> Result<SeenSet> {
    let _guard = match REMEMBER_LOCKS.get(&key) {
        Some(lock) => Some(lock.lock().await),
        None => None,
    };
    let mut seen = SeenSet::from(store.get(key).await?);
    let before = seen.len();
    seen.extend(new_items.iter().cloned());
    if seen.len() != before {
        store.put(key, seen.to_vec()).await?;
    }
    Ok(seen)
}

// ------------------------------------------------------------
// SeenSet
// ------------------------------------------------------------

/// Insertion-ordered set of identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Returns `false` when `id` was already present.
    pub fn insert(&mut self, id: String) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn union(&self, other: &SeenSet) -> SeenSet {
        let mut out = self.clone();
        out.extend(other.iter().cloned());
        out
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl Extend<String> for SeenSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut s = SeenSet::new();
        s.extend(iter);
        s
    }
}

impl From<Vec<String>> for SeenSet {
    fn from(v: Vec<String>) -> Self {
        v.into_iter().collect()
    }
}

// ------------------------------------------------------------
// In-memory store
// ------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<SourceKey, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupStore for MemoryStore {
    async fn get(&self, key: SourceKey) -> Result<Vec<String>> {
        Ok(self.inner.read().await.get(&key).cloned().unwrap_or_default())
    }

    async fn put(&self, key: SourceKey, items: Vec<String>) -> Result<()> {
        self.inner.write().await.insert(key, items);
        Ok(())
    }
}

// ------------------------------------------------------------
// JSON file store (one file per key)
// ------------------------------------------------------------

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating store dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: SourceKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl DedupStore for JsonFileStore {
    async fn get(&self, key: SourceKey) -> Result<Vec<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing seen list {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("reading seen list {}", path.display())),
        }
    }

    async fn put(&self, key: SourceKey, items: Vec<String>) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(&items)?;
        tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
            .await
            .context("store write task")?
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_set_keeps_first_insertion_order() {
        let mut s = SeenSet::from(vec!["b".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(s.len(), 2);
        assert!(!s.insert("a".into()));
        assert!(s.insert("c".into()));
        assert_eq!(s.into_vec(), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn remember_never_shrinks() {
        let store = MemoryStore::new();
        store
            .put(SourceKey::GithubRepos, vec!["x".into(), "y".into()])
            .await
            .unwrap();
        let merged = remember(&store, SourceKey::GithubRepos, &["y".into(), "z".into()])
            .await
            .unwrap();
        assert_eq!(merged.into_vec(), vec!["x", "y", "z"]);
        assert_eq!(
            store.get(SourceKey::GithubRepos).await.unwrap(),
            vec!["x", "y", "z"]
        );
        assert!(store.get(SourceKey::LatentSpaceLinks).await.unwrap().is_empty());
    }

    /// Memory store whose reads yield before answering, so concurrent
    /// callers interleave between read and write.
    #[derive(Default)]
    struct YieldingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl DedupStore for YieldingStore {
        async fn get(&self, key: SourceKey) -> Result<Vec<String>> {
            tokio::task::yield_now().await;
            let items = self.inner.get(key).await;
            tokio::task::yield_now().await;
            items
        }

        async fn put(&self, key: SourceKey, items: Vec<String>) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.put(key, items).await
        }
    }

    #[tokio::test]
    async fn overlapping_remember_calls_keep_both_additions() {
        let store = YieldingStore::default();
        store
            .put(SourceKey::LatentSpaceLinks, vec!["x".into()])
            .await
            .unwrap();

        let add_a: [String; 1] = ["a".into()];
        let add_b: [String; 1] = ["b".into()];
        let (a, b) = tokio::join!(
            remember(&store, SourceKey::LatentSpaceLinks, &add_a),
            remember(&store, SourceKey::LatentSpaceLinks, &add_b),
        );
        a.unwrap();
        b.unwrap();

        let mut stored = store.get(SourceKey::LatentSpaceLinks).await.unwrap();
        assert_eq!(stored.first().map(String::as_str), Some("x"));
        stored.sort();
        assert_eq!(stored, vec!["a", "b", "x"]);
    }

    #[tokio::test]
    async fn json_store_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("seen")).unwrap();
        assert!(store.get(SourceKey::LatentSpaceLinks).await.unwrap().is_empty());

        store
            .put(SourceKey::LatentSpaceLinks, vec!["https://l/1".into()])
            .await
            .unwrap();
        let again = JsonFileStore::new(tmp.path().join("seen")).unwrap();
        assert_eq!(
            again.get(SourceKey::LatentSpaceLinks).await.unwrap(),
            vec!["https://l/1"]
        );
        assert!(tmp.path().join("seen/latent_space_links.json").exists());
    }
}
