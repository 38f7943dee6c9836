//! Persistent response cache.
//!
//! Maps a normalized-query fingerprint to a previously retrieved result
//! payload, persisted as a single JSON document so re-runs of the pipeline
//! skip network calls they already paid for. The cache is strictly
//! best-effort: a missing, unreadable, or malformed backing file degrades
//! to an empty cache and a miss never blocks or fails the caller.
//!
//! Durable writes go through a dedicated writer task fed by a queue.
//! Snapshots are coalesced (only the newest queued state is written) and
//! never interleave, so a burst of stores cannot corrupt the file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, OnceCell, RwLock};

/// How many pending writes may queue before stores are backpressured.
const WRITE_QUEUE_DEPTH: usize = 32;

/// Deterministic cache key for an operation, normalized query, and limit.
#[must_use]
pub fn cache_key(kind: &str, query: &str, limit: usize) -> String {
    format!("{kind}:{limit}:{query}")
}

/// On-disk document: `{ "entries": [ { "key", "ts", "value" } ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    /// Unix seconds at which the entry was stored.
    ts: i64,
    value: serde_json::Value,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    ts: i64,
    value: serde_json::Value,
}

enum WriteMsg {
    Snapshot(String),
    Flush(oneshot::Sender<()>),
}

/// TTL-bounded response cache with durable JSON persistence.
///
/// The backing file is read lazily, at most once per process. Entries are
/// never mutated in place, only replaced wholesale by a newer store.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    loaded: OnceCell<()>,
    path: PathBuf,
    writer: mpsc::Sender<WriteMsg>,
}

impl ResponseCache {
    /// Create a cache backed by `path`. Must be called from within a Tokio
    /// runtime; the writer task is spawned here.
    #[must_use]
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        let (writer, rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
        tokio::spawn(drain_writes(rx, path.clone()));
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            loaded: OnceCell::new(),
            path,
            writer,
        }
    }

    /// Return the stored payload for `key` if it is still within the TTL.
    ///
    /// Expired entries are tolerated in storage but never served.
    pub async fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        self.ensure_loaded().await;
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if self.is_fresh(entry.ts) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or overwrite `key` with the current timestamp, then enqueue a
    /// full-state snapshot for durable persistence.
    ///
    /// The snapshot is enqueued while the write lock is still held, so
    /// snapshots reach the writer in state order: the last queued snapshot
    /// always reflects the newest in-memory state.
    pub async fn store(&self, key: &str, value: serde_json::Value) {
        self.ensure_loaded().await;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                ts: chrono::Utc::now().timestamp(),
                value,
            },
        );
        match serialize_entries(&entries) {
            Ok(json) => {
                if self.writer.send(WriteMsg::Snapshot(json)).await.is_err() {
                    tracing::warn!("cache writer is gone, skipping persistence");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize cache snapshot"),
        }
    }

    /// Wait until every snapshot enqueued so far has been written out.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.writer.send(WriteMsg::Flush(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    fn is_fresh(&self, ts: i64) -> bool {
        let age = chrono::Utc::now().timestamp().saturating_sub(ts);
        age >= 0 && age as u64 <= self.ttl.as_secs()
    }

    /// Rehydrate from the backing file, once, discarding entries that were
    /// already stale at load time. Read failures are never fatal.
    async fn ensure_loaded(&self) {
        self.loaded
            .get_or_init(|| async {
                let contents = match tokio::fs::read_to_string(&self.path).await {
                    Ok(contents) => contents,
                    Err(err) => {
                        tracing::debug!(path = %self.path.display(), %err, "no cache file, starting empty");
                        return;
                    }
                };
                let file: CacheFile = match serde_json::from_str(&contents) {
                    Ok(file) => file,
                    Err(err) => {
                        tracing::warn!(path = %self.path.display(), %err, "malformed cache file, starting empty");
                        return;
                    }
                };
                let mut entries = self.entries.write().await;
                for stored in file.entries {
                    if self.is_fresh(stored.ts) {
                        entries.insert(
                            stored.key,
                            CacheEntry {
                                ts: stored.ts,
                                value: stored.value,
                            },
                        );
                    }
                }
                tracing::debug!(count = entries.len(), "rehydrated response cache");
            })
            .await;
    }
}

fn serialize_entries(entries: &HashMap<String, CacheEntry>) -> serde_json::Result<String> {
    let file = CacheFile {
        entries: entries
            .iter()
            .map(|(key, entry)| StoredEntry {
                key: key.clone(),
                ts: entry.ts,
                value: entry.value.clone(),
            })
            .collect(),
    };
    serde_json::to_string(&file)
}

/// Writer task: drains queued snapshots, keeping only the most recent, and
/// writes it to the backing file. One writer means writes never interleave.
async fn drain_writes(mut rx: mpsc::Receiver<WriteMsg>, path: PathBuf) {
    while let Some(msg) = rx.recv().await {
        let mut pending = None;
        let mut acks = Vec::new();
        let mut msg = Some(msg);
        // Coalesce everything already queued behind this message.
        loop {
            match msg {
                Some(WriteMsg::Snapshot(json)) => pending = Some(json),
                Some(WriteMsg::Flush(ack)) => acks.push(ack),
                None => {}
            }
            msg = match rx.try_recv() {
                Ok(next) => Some(next),
                Err(_) => break,
            };
        }

        if let Some(json) = pending {
            if let Some(parent) = path.parent() {
                if let Err(err) = tokio::fs::create_dir_all(parent).await {
                    tracing::warn!(%err, "failed to create cache directory");
                }
            }
            if let Err(err) = tokio::fs::write(&path, json).await {
                tracing::warn!(path = %path.display(), %err, "failed to persist cache");
            }
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
}
