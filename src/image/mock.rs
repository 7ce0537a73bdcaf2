use super::{CompressionResult, ImageService, JPEG_CONTENT_TYPE};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockImageProcessor {
    process_count: Arc<Mutex<usize>>,
    output: Vec<u8>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            output: vec![0xFF, 0xD8, 0xFF, 0xD9],
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }
}

impl Default for MockImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageProcessor {
    async fn compress(&self, _raw: &[u8]) -> Result<CompressionResult> {
        let mut count = self.process_count.lock().unwrap();
        *count += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Decode(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        Ok(CompressionResult {
            bytes: self.output.clone(),
            content_type: JPEG_CONTENT_TYPE,
            width: 1,
            height: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_image_processor() {
        let processor = MockImageProcessor::new().with_output(b"jpeg".to_vec());

        let result = processor.compress(b"fake image data").await.unwrap();

        assert_eq!(result.bytes, b"jpeg");
        assert_eq!(result.content_type, "image/jpeg");
        assert_eq!(processor.get_process_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let processor = MockImageProcessor::new().with_failure(true);

        let result = processor.compress(b"data").await;
        assert!(result.is_err());
        assert_eq!(processor.get_process_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_clones_share_counter() {
        let processor = MockImageProcessor::new();
        let probe = processor.clone();

        processor.compress(b"a").await.unwrap();
        processor.compress(b"b").await.unwrap();

        assert_eq!(probe.get_process_count(), 2);
    }
}
