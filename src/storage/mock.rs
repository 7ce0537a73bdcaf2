use super::ObjectStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

type ObjectId = (String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// In-memory store. Clones share state, so a clone kept by a test observes
/// every call made through the original.
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<ObjectId, Vec<u8>>>>,
    puts: Arc<Mutex<Vec<PutRecord>>>,
    get_count: Arc<Mutex<usize>>,
    unreachable: Arc<Mutex<HashSet<ObjectId>>>,
    fail_puts: Arc<Mutex<bool>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, content: Vec<u8>) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), content);
        self
    }

    /// Make `get` on this object fail with a transport error.
    pub fn with_unreachable(self, bucket: &str, key: &str) -> Self {
        self.unreachable
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()));
        self
    }

    pub fn with_put_failure(self, fail: bool) -> Self {
        *self.fail_puts.lock().unwrap() = fail;
        self
    }

    pub fn get_get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn get_puts(&self) -> Vec<PutRecord> {
        self.puts.lock().unwrap().clone()
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        *self.get_count.lock().unwrap() += 1;

        let id = (bucket.to_string(), key.to_string());
        if self.unreachable.lock().unwrap().contains(&id) {
            return Err(Error::Transport(format!(
                "Failed to get object: connection refused for {}/{}",
                bucket, key
            )));
        }

        self.objects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        if *self.fail_puts.lock().unwrap() {
            return Err(Error::Transport("Failed to put object: access denied".to_string()));
        }

        self.puts.lock().unwrap().push(PutRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content: content.clone(),
            content_type: content_type.to_string(),
        });
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_mock_store_put_and_get() {
        let store = MockObjectStore::new();

        assert_ok!(store.put("imgs", "a.jpg", b"data".to_vec(), "image/jpeg").await);

        assert_eq!(store.get("imgs", "a.jpg").await.unwrap(), b"data");
        assert_eq!(store.get_put_count(), 1);
        assert_eq!(store.get_get_count(), 1);
        assert_eq!(store.get_puts()[0].content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_mock_store_put_overwrites() {
        let store = MockObjectStore::new().with_object("imgs", "a.jpg", b"old".to_vec());

        assert_ok!(store.put("imgs", "a.jpg", b"new".to_vec(), "image/jpeg").await);

        assert_eq!(store.get_object("imgs", "a.jpg").unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_mock_store_missing_object() {
        let store = MockObjectStore::new();

        let err = store.get("imgs", "missing.jpg").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mock_store_failures() {
        let store = MockObjectStore::new()
            .with_object("imgs", "a.jpg", b"data".to_vec())
            .with_unreachable("imgs", "a.jpg")
            .with_put_failure(true);

        assert!(matches!(
            store.get("imgs", "a.jpg").await.unwrap_err(),
            Error::Transport(_)
        ));
        assert_err!(store.put("imgs", "b.jpg", vec![1], "image/jpeg").await);
        assert_eq!(store.get_put_count(), 0);
    }
}
