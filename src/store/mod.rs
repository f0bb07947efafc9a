// SPDX-License-Identifier: GPL-2.0-or-later
//
// Provides the clip store abstraction and its implementations.

use std::future::Future;

use earmark_api_structs::{Clip, NewClip};

mod memory;
mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

/// Read, count, and insert operations over the single clip table.
///
/// The store owns the clips; everything else works with copies. Clips are never updated or
/// deleted through this interface.
pub trait ClipStore: Send + Sync + 'static {
    /// All clips, newest first. No pagination is performed.
    fn list(&self) -> impl Future<Output = Result<Vec<Clip>, crate::Error>> + Send;

    /// The total number of clips.
    fn count(&self) -> impl Future<Output = Result<u64, crate::Error>> + Send;

    /// The clip at `offset` under the store's default ordering, if there is one.
    ///
    /// The default ordering is not guaranteed to match [`ClipStore::list`].
    fn fetch_at(&self, offset: u64)
        -> impl Future<Output = Result<Option<Clip>, crate::Error>> + Send;

    /// Store a new clip; the store assigns its `id` and `created_at`.
    fn insert(&self, clip: NewClip) -> impl Future<Output = Result<Clip, crate::Error>> + Send;
}
