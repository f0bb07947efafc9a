use chrono::{DateTime, Duration, Utc};
use earmark_api_structs::{Clip, NewClip};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use super::ClipStore;

/// A clip store that lives and dies with the process.
///
/// Clips are kept in insertion order, which doubles as the default ordering for
/// [`ClipStore::fetch_at`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    clips: RwLock<Vec<Clip>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipStore for MemoryStore {
    #[instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Clip>, crate::Error> {
        let clips = self.clips.read().await;
        let mut newest_first = clips.clone();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(newest_first)
    }

    #[instrument(skip_all)]
    async fn count(&self) -> Result<u64, crate::Error> {
        Ok(self.clips.read().await.len() as u64)
    }

    #[instrument(skip(self))]
    async fn fetch_at(&self, offset: u64) -> Result<Option<Clip>, crate::Error> {
        let clips = self.clips.read().await;
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|offset| clips.get(offset))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn insert(&self, clip: NewClip) -> Result<Clip, crate::Error> {
        let mut clips = self.clips.write().await;
        // Creation times must be strictly increasing for the newest-first ordering to hold,
        // even when the clock doesn't move between two inserts.
        let now = Utc::now();
        let created_at = match clips.last() {
            Some(last) if last.created_at >= now => next_tick(last.created_at),
            _ => now,
        };
        let clip = clip.into_clip(Uuid::new_v4().to_string(), created_at);
        clips.push(clip.clone());
        Ok(clip)
    }
}

fn next_tick(time: DateTime<Utc>) -> DateTime<Utc> {
    time + Duration::microseconds(1)
}
