//! Batch orchestration: fetch, compress and store one image per notification.

use crate::image::ImageService;
use crate::models::{BatchItemFailure, BatchResponse, FailurePolicy, Notification, SqsEvent};
use crate::storage::ObjectStore;
use crate::Error;
use std::fmt;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Pipeline step at which a notification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Compress,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Compress => "compress",
            Stage::Store => "store",
        };
        f.write_str(name)
    }
}

/// Terminal state of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done {
        bytes_in: usize,
        bytes_out: usize,
        width: u32,
        height: u32,
    },
    Skipped {
        reason: String,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
}

impl Outcome {
    fn failed(stage: Stage, err: &Error) -> Self {
        Outcome::Failed {
            stage,
            reason: err.to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub message_id: String,
    pub outcome: Outcome,
}

/// Outcomes for a whole batch, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn done(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_done()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_failed()).count()
    }

    /// What to hand back to the delivery runtime. Skipped items are never
    /// listed: redelivery cannot supply a missing attribute.
    pub fn response(&self, policy: FailurePolicy) -> BatchResponse {
        let batch_item_failures = match policy {
            FailurePolicy::AlwaysSucceed => Vec::new(),
            FailurePolicy::ReportFailures => self
                .items
                .iter()
                .filter(|item| item.outcome.is_failed())
                .map(|item| BatchItemFailure {
                    item_identifier: item.message_id.clone(),
                })
                .collect(),
        };

        BatchResponse {
            batch_item_failures,
        }
    }
}

/// Processes queue batches against an injected store and image service.
pub struct BatchHandler {
    store: Box<dyn ObjectStore>,
    image: Box<dyn ImageService>,
    policy: FailurePolicy,
}

impl BatchHandler {
    pub fn new(
        store: Box<dyn ObjectStore>,
        image: Box<dyn ImageService>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            store,
            image,
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Handle one delivered event and build the response for the runtime.
    pub async fn run(&self, event: &SqsEvent) -> BatchResponse {
        let report = self.handle_batch(&event.records).await;
        let response = report.response(self.policy);

        if !response.is_success() {
            warn!(
                "Reporting {} failed message(s) for redelivery",
                response.batch_item_failures.len()
            );
        }
        response
    }

    /// Process every notification in order. Individual failures never stop
    /// the batch.
    pub async fn handle_batch(&self, notifications: &[Notification]) -> BatchReport {
        let span = info_span!("batch", invocation_id = %Uuid::new_v4(), size = notifications.len());

        async move {
            let mut report = BatchReport::default();
            for notification in notifications {
                let outcome = self.process(notification).await;
                report.items.push(ItemReport {
                    message_id: notification.message_id.clone(),
                    outcome,
                });
            }

            info!(
                done = report.done(),
                skipped = report.skipped(),
                failed = report.failed(),
                "Batch complete"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn process(&self, notification: &Notification) -> Outcome {
        let message_id = notification.message_id.as_str();

        let location = match notification.image_location() {
            Ok(location) => location,
            Err(e) => {
                warn!(message_id, "Skipping message: {}", e);
                return Outcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };
        let (bucket, key) = (location.bucket.as_str(), location.key.as_str());

        let raw = match self.store.get(bucket, key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(message_id, bucket, key, stage = %Stage::Fetch, "Error getting image: {}", e);
                return Outcome::failed(Stage::Fetch, &e);
            }
        };
        let bytes_in = raw.len();

        let compressed = match self.image.compress(&raw).await {
            Ok(compressed) => compressed,
            Err(e) => {
                error!(message_id, bucket, key, stage = %Stage::Compress, "Error compressing image: {}", e);
                return Outcome::failed(Stage::Compress, &e);
            }
        };
        drop(raw);

        let bytes_out = compressed.bytes.len();
        if let Err(e) = self
            .store
            .put(bucket, key, compressed.bytes, compressed.content_type)
            .await
        {
            error!(message_id, bucket, key, stage = %Stage::Store, "Error uploading image: {}", e);
            return Outcome::failed(Stage::Store, &e);
        }

        info!(
            message_id,
            event_source = %notification.event_source,
            body = %notification.body,
            "Compressed {} ({} -> {} bytes, {}x{})",
            location,
            bytes_in,
            bytes_out,
            compressed.width,
            compressed.height
        );

        Outcome::Done {
            bytes_in,
            bytes_out,
            width: compressed.width,
            height: compressed.height,
        }
    }
}
