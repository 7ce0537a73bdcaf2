use super::ObjectStore;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client as S3Client};

pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Resolve credentials through the default provider chain and build a
    /// client for the configured region and optional custom endpoint.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        Self::new(S3Client::from_conf(s3_config))
    }

    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    Error::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    Error::Transport(format!("Failed to get object: {}", DisplayErrorContext(&e)))
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read body: {}", e)))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to put object: {}", DisplayErrorContext(&e))))?;

        Ok(())
    }
}
