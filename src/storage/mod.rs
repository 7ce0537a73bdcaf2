//! Object storage access
//!
//! Reads source images from and writes compressed images back to
//! S3-compatible storage, addressed by bucket and key.

pub mod client;
pub mod mock;

pub use client::S3ObjectStore;
pub use mock::MockObjectStore;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Full object content. Fails with `Error::NotFound` when the key does
    /// not exist and `Error::Transport` for anything else.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write `content`, replacing any existing object at `key`.
    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>, content_type: &str) -> Result<()>;
}
