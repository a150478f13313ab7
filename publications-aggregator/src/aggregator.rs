use crate::fetcher::Fetcher;
use crate::sources::{PubMedSource, SheetSource};
use crate::traits::PublicationSource;
use crate::types::{NormalizedRecord, Result, SiteConfig, SourceTag};
use futures::future::join_all;
use std::cmp::Reverse;
use tracing::info;

/// Records from every source, merged and ordered newest first.
#[derive(Debug, Default)]
pub struct AggregatedPublications {
    pub records: Vec<NormalizedRecord>,
    /// Record count per source, in source order.
    pub source_counts: Vec<(SourceTag, usize)>,
}

pub struct PublicationAggregator {
    sources: Vec<Box<dyn PublicationSource>>,
}

impl PublicationAggregator {
    pub fn new(sources: Vec<Box<dyn PublicationSource>>) -> Self {
        Self { sources }
    }

    /// One PubMed source plus one sheet source per configured tab.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(config.fetch.clone())?;

        let mut sources: Vec<Box<dyn PublicationSource>> = Vec::new();
        sources.push(Box::new(PubMedSource::new(config.pubmed.clone(), fetcher.clone())?));
        for tab in &config.sheet.tabs {
            sources.push(Box::new(SheetSource::new(
                &config.sheet.base_url,
                &config.sheet.sheet_id,
                tab,
                fetcher.clone(),
            )?));
        }

        Ok(Self::new(sources))
    }

    pub fn source_tags(&self) -> Vec<SourceTag> {
        self.sources.iter().map(|s| s.source_tag().clone()).collect()
    }

    /// Pull every source concurrently and wait for all of them. Sources
    /// never fail here: a broken source simply contributes nothing.
    pub async fn collect(&self) -> AggregatedPublications {
        info!("Pulling {} sources", self.sources.len());

        let batches = join_all(self.sources.iter().map(|source| source.pull_or_empty())).await;

        let source_counts: Vec<(SourceTag, usize)> = self
            .sources
            .iter()
            .zip(&batches)
            .map(|(source, batch)| (source.source_tag().clone(), batch.len()))
            .collect();

        let records = merge_sorted(batches);
        for (tag, count) in &source_counts {
            info!("  {}: {}", tag, count);
        }
        info!("Merged {} publications", records.len());

        AggregatedPublications {
            records,
            source_counts,
        }
    }
}

/// Concatenate `batches` in order and sort newest first. The sort is stable,
/// so records sharing a date (including the undated fallback) keep their
/// source order.
pub fn merge_sorted(batches: Vec<Vec<NormalizedRecord>>) -> Vec<NormalizedRecord> {
    let mut records: Vec<NormalizedRecord> = batches.into_iter().flatten().collect();
    records.sort_by_key(|record| Reverse(record.sort_key));
    records
}
