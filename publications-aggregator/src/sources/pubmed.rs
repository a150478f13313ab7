use crate::fetcher::Fetcher;
use crate::parser::{SearchResponse, SummaryParser, SummaryResponse};
use crate::traits::PublicationSource;
use crate::types::{AggregatorError, NormalizedRecord, PubMedConfig, Result, SourceTag};
use crate::utils::url::endpoint;
use async_trait::async_trait;
use tracing::{info, warn};

/// PubMed E-utilities source: an author search followed by one batched
/// summary request for every identifier found.
pub struct PubMedSource {
    config: PubMedConfig,
    tag: SourceTag,
    fetcher: Fetcher,
}

impl PubMedSource {
    pub fn new(config: PubMedConfig, fetcher: Fetcher) -> Result<Self> {
        let tag = SourceTag::new(config.label.as_str())
            .ok_or_else(|| AggregatorError::Config("pubmed.label must not be empty".to_string()))?;
        Ok(Self {
            config,
            tag,
            fetcher,
        })
    }

    /// Identifiers matching the search term, newest publication first.
    pub async fn search_ids(&self) -> Result<Vec<String>> {
        let retmax = self.config.retmax.to_string();
        let url = endpoint(
            &self.config.base_url,
            &["esearch.fcgi"],
            &[
                ("db", "pubmed"),
                ("term", self.config.term.as_str()),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
                ("sort", "pub_date"),
            ],
        )?;

        let response: SearchResponse = self.fetcher.fetch_json(&url).await?;
        if let Some(error) = response.esearchresult.error {
            warn!("PubMed search for '{}' reported: {}", self.config.term, error);
        }
        Ok(response.esearchresult.idlist)
    }

    pub async fn fetch_summaries(&self, ids: &[String]) -> Result<SummaryResponse> {
        let joined = ids.join(",");
        let url = endpoint(
            &self.config.base_url,
            &["esummary.fcgi"],
            &[("db", "pubmed"), ("id", joined.as_str()), ("retmode", "json")],
        )?;
        self.fetcher.fetch_json(&url).await
    }
}

#[async_trait]
impl PublicationSource for PubMedSource {
    fn source_tag(&self) -> &SourceTag {
        &self.tag
    }

    fn source_name(&self) -> String {
        format!("PubMed ({})", self.config.term)
    }

    async fn pull(&self) -> Result<Vec<NormalizedRecord>> {
        let ids = self.search_ids().await?;
        if ids.is_empty() {
            info!("PubMed search for '{}' returned no identifiers", self.config.term);
            return Ok(Vec::new());
        }

        info!("PubMed search returned {} identifiers", ids.len());
        let summaries = self.fetch_summaries(&ids).await?;
        let parser = SummaryParser::new(self.tag.clone(), self.config.link_prefix.as_str());
        Ok(parser.parse(&summaries))
    }
}
