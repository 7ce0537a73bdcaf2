//! Data models and structures
//!
//! Defines the queue event envelope delivered to the worker, the batch
//! response handed back to the delivery runtime, and the worker configuration.

use crate::image::CompressionOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const BUCKET_NAME_ATTRIBUTE: &str = "bucket_name";
pub const IMAGE_OBJECT_KEY_ATTRIBUTE: &str = "image_object_key";

/// A batch of queue notifications as delivered to one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<Notification>,
}

impl SqsEvent {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttribute {
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            data_type: Some("String".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message_id: String,
    #[serde(default)]
    pub receipt_handle: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub event_source: String,
    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: Option<String>,
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub message_attributes: HashMap<String, MessageAttribute>,
}

impl Notification {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            event_source: "aws:sqs".to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.message_attributes
            .insert(name.to_string(), MessageAttribute::string(value));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// String value of a message attribute. An attribute without a string
    /// value is treated as absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.message_attributes
            .get(name)
            .and_then(|attr| attr.string_value.as_deref())
    }

    fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    /// Where the image this notification refers to lives.
    pub fn image_location(&self) -> Result<ObjectLocation> {
        let bucket = self.required_attribute(BUCKET_NAME_ATTRIBUTE)?;
        let key = self.required_attribute(IMAGE_OBJECT_KEY_ATTRIBUTE)?;

        Ok(ObjectLocation::new(bucket, key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Partial batch response returned to the delivery runtime. Listed items are
/// redelivered; everything else in the batch is considered consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl BatchResponse {
    pub fn is_success(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}

/// Whether per-item failures are surfaced to the delivery runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Failures are logged only; the batch always reports success.
    #[default]
    AlwaysSucceed,
    /// Failed items are listed in the batch response for redelivery.
    ReportFailures,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always-succeed" => Ok(FailurePolicy::AlwaysSucceed),
            "report-failures" => Ok(FailurePolicy::ReportFailures),
            other => Err(Error::Config(format!(
                "Unknown failure policy '{}'. Expected 'always-succeed' or 'report-failures'",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub compression: CompressionOptions,
    pub failure_policy: FailurePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CompressionOptions::default();

        let scale_divisor = match lookup("SCALE_DIVISOR") {
            Some(raw) => parse_number::<u32>("SCALE_DIVISOR", &raw)?,
            None => defaults.scale_divisor,
        };
        let jpeg_quality = match lookup("JPEG_QUALITY") {
            Some(raw) => parse_number::<u8>("JPEG_QUALITY", &raw)?,
            None => defaults.jpeg_quality,
        };
        let compression = CompressionOptions {
            scale_divisor,
            jpeg_quality,
            ..defaults
        };
        compression.validate()?;

        let force_path_style = match lookup("S3_FORCE_PATH_STYLE") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                Error::Config(format!("S3_FORCE_PATH_STYLE must be true or false, got '{}'", raw))
            })?,
            None => false,
        };

        Ok(Self {
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: lookup("S3_ENDPOINT_URL").filter(|url| !url.trim().is_empty()),
            force_path_style,
            compression,
            failure_policy: lookup("FAILURE_POLICY")
                .map(|raw| raw.parse::<FailurePolicy>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: '{}'", name, raw)))
}
