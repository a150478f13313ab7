use crate::types::{NormalizedRecord, Result, SourceTag};
use async_trait::async_trait;
use tracing::{error, info};

/// Trait for pulling publication records from one external source
#[async_trait]
pub trait PublicationSource: Send + Sync {
    /// Tag stamped on every record this source produces
    fn source_tag(&self) -> &SourceTag;

    /// Human-readable name for logs
    fn source_name(&self) -> String;

    /// Fetch and normalize every record the source currently holds
    async fn pull(&self) -> Result<Vec<NormalizedRecord>>;

    /// [`pull`](Self::pull), with any failure logged and turned into an
    /// empty contribution so one source never sinks the others.
    async fn pull_or_empty(&self) -> Vec<NormalizedRecord> {
        match self.pull().await {
            Ok(records) => {
                info!("Pulled {} records from {}", records.len(), self.source_name());
                records
            }
            Err(e) => {
                error!("Failed to pull from {}: {}", self.source_name(), e);
                Vec::new()
            }
        }
    }
}
